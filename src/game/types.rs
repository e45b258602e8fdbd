//! Core board types for the OX game.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Number of cells on the board (3x3, row-major).
pub const BOARD_CELLS: usize = 9;

/// A mark placed on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Mark {
    /// The human player's mark.
    X,
    /// The server AI's mark.
    O,
}

/// A square on the board.
///
/// On the wire a cell is `"X"`, `"O"` or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<Mark>", into = "Option<Mark>")]
pub enum Cell {
    /// Nobody has played here yet.
    #[default]
    Empty,
    /// Square occupied by a mark.
    Occupied(Mark),
}

impl Cell {
    /// Returns `true` if nobody has played this cell.
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Returns the mark on this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(mark) => Some(mark),
        }
    }
}

impl From<Option<Mark>> for Cell {
    fn from(value: Option<Mark>) -> Self {
        value.map_or(Cell::Empty, Cell::Occupied)
    }
}

impl From<Cell> for Option<Mark> {
    fn from(cell: Cell) -> Self {
        cell.mark()
    }
}

/// 3x3 OX board.
///
/// Always exactly [`BOARD_CELLS`] cells. The board is replaced wholesale when
/// the authority confirms a move; there is no per-cell setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [Cell; BOARD_CELLS],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from its cells in row-major order.
    pub fn from_cells(cells: [Cell; BOARD_CELLS]) -> Self {
        Self { cells }
    }

    /// Gets the cell at `index` (0-8).
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Checks if the cell at `index` exists and is empty.
    pub fn is_empty_at(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Cell::Empty))
    }

    /// Returns `true` when no cell is occupied.
    #[instrument(skip(self))]
    pub fn is_clear(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_empty())
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (row, cells) in self.cells.chunks(3).enumerate() {
            if row > 0 {
                writeln!(f)?;
                writeln!(f, "-+-+-")?;
            }
            for (col, cell) in cells.iter().enumerate() {
                if col > 0 {
                    write!(f, "|")?;
                }
                match cell.mark() {
                    Some(mark) => write!(f, "{}", mark)?,
                    None => write!(f, "{}", row * 3 + col + 1)?,
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_wire_format() {
        let cells = [Cell::Occupied(Mark::X), Cell::Empty, Cell::Occupied(Mark::O)];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r#"["X",null,"O"]"#);
    }

    #[test]
    fn test_board_rejects_short_sequence() {
        let result: Result<Board, _> = serde_json::from_str(r#"["X",null,"O"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_board_rejects_long_sequence() {
        let result: Result<Board, _> =
            serde_json::from_str(r#"[null,null,null,null,null,null,null,null,null,null]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_display_numbers_empty_cells() {
        let mut cells = [Cell::Empty; BOARD_CELLS];
        cells[4] = Cell::Occupied(Mark::X);
        let board = Board::from_cells(cells);
        assert_eq!(board.to_string(), "1|2|3\n-+-+-\n4|X|6\n-+-+-\n7|8|9");
    }

    #[test]
    fn test_is_empty_at_out_of_range() {
        assert!(!Board::new().is_empty_at(9));
    }
}
