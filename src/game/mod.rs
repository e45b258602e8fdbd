//! Board and phase types for the OX game.

mod phase;
mod types;

pub use phase::{AuthorityOutcome, SessionPhase};
pub use types::{BOARD_CELLS, Board, Cell, Mark};
