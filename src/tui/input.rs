//! Cursor movement for keyboard navigation.

use crossterm::event::KeyCode;

use crate::game::BOARD_CELLS;

/// Moves the board cursor (0-8, row-major) based on arrow keys.
///
/// The cursor stops at the board edges; other keys leave it where it is.
pub fn move_cursor(cursor: usize, key: KeyCode) -> usize {
    let (row, col) = (cursor / 3, cursor % 3);

    let next = match key {
        KeyCode::Right if col < 2 => cursor + 1,
        KeyCode::Left if col > 0 => cursor - 1,
        KeyCode::Down if row < 2 => cursor + 3,
        KeyCode::Up if row > 0 => cursor - 3,
        _ => cursor,
    };

    next.min(BOARD_CELLS - 1)
}

/// Maps digit keys 1-9 to cell indices 0-8.
pub fn digit_cell(key: KeyCode) -> Option<usize> {
    match key {
        KeyCode::Char(c) => c
            .to_digit(10)
            .filter(|digit| (1..=9).contains(digit))
            .map(|digit| digit as usize - 1),
        _ => None,
    }
}
