//! Session phases and the authority's outcome vocabulary.

use derive_more::Display;
use tracing::instrument;

/// Lifecycle phase of a client session.
///
/// ```text
/// NotStarted --reset--> InProgress --move(non-terminal)--> InProgress
/// InProgress --move(terminal)--> Won | Lost | Drawn --reset--> InProgress
/// any --clear_credential--> NotStarted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum SessionPhase {
    /// No game has been started since startup or logout.
    #[default]
    #[display("not started")]
    NotStarted,
    /// A game is running and it is the human's turn.
    #[display("in progress")]
    InProgress,
    /// The authority reported a human win.
    #[display("won")]
    Won,
    /// The authority reported an AI win.
    #[display("lost")]
    Lost,
    /// The authority reported a draw.
    #[display("drawn")]
    Drawn,
}

impl SessionPhase {
    /// Returns `true` for `Won`, `Lost` and `Drawn`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost | Self::Drawn)
    }
}

/// Outcome code carried in a move response's `gameStatus` field.
///
/// The codes are written from the board's point of view: `"X"` is the human's
/// mark, `"O"` the AI's. Anything unrecognised means the game continues.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum AuthorityOutcome {
    /// `"X"` won.
    #[display("X")]
    HumanWon,
    /// `"O"` won.
    #[display("O")]
    AiWon,
    /// `"DRAW"`.
    #[display("DRAW")]
    Draw,
    /// Any other code, kept verbatim for logging.
    #[display("{}", _0)]
    Continuing(String),
}

impl AuthorityOutcome {
    /// Maps a raw `gameStatus` code. Total: every input yields an outcome.
    #[instrument]
    pub fn parse(code: &str) -> Self {
        match code {
            "X" => Self::HumanWon,
            "O" => Self::AiWon,
            "DRAW" => Self::Draw,
            other => Self::Continuing(other.to_string()),
        }
    }

    /// Session phase this outcome moves the session into.
    pub fn phase(&self) -> SessionPhase {
        match self {
            Self::HumanWon => SessionPhase::Won,
            Self::AiWon => SessionPhase::Lost,
            Self::Draw => SessionPhase::Drawn,
            Self::Continuing(_) => SessionPhase::InProgress,
        }
    }
}
