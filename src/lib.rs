//! Strictly OX library - terminal client for a server-authoritative OX game
//!
//! The human plays X against an AI opponent that lives on a remote
//! authority. The client never decides outcomes: it validates moves locally,
//! submits them, and renders whatever board, outcome and score the authority
//! answers with.
//!
//! # Architecture
//!
//! - **Session**: client-side game state with generation-guarded updates
//! - **Moves**: local legality checks and the authority round trip
//! - **Ranking**: background leaderboard polling
//! - **Credential**: login redirect, durable storage and startup recovery
//! - **TUI**: ratatui front end
//!
//! # Example
//!
//! ```no_run
//! use strictly_ox::{ApiClient, GameSession, MemoryCredentialStore, play_cell};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = ApiClient::new("http://localhost:3000")?;
//! let mut session = GameSession::new(Box::new(MemoryCredentialStore::new()));
//!
//! session.load_credential("my-token")?;
//! session.reset();
//!
//! let outcome = play_cell(&mut session, &client, 4).await?;
//! println!("{:?} -> {}", outcome, session.phase());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod api;
mod config;
mod credential;
mod game;
mod moves;
mod ranking;
mod session;
mod tui;

// Crate-level exports - Game types
pub use game::{AuthorityOutcome, BOARD_CELLS, Board, Cell, Mark, SessionPhase};

// Crate-level exports - Session
pub use session::{
    ApplyRejection, GameSession, MoveRejection, MoveResult, MoveTicket, NoCredential,
};

// Crate-level exports - Credential
pub use credential::{
    Bootstrap, Credential, CredentialLifecycle, CredentialSource, CredentialStore,
    FileCredentialStore, LoginProvider, MemoryCredentialStore, StoreError, TOKEN_QUERY_PARAM,
    UrlParseError, login_url, take_token,
};

// Crate-level exports - Authority API
pub use api::{ApiClient, ApiError, ApiErrorKind, GAME_API_PREFIX, MoveRequest, MoveResponse};

// Crate-level exports - Move submission
pub use moves::{MoveAuthority, MoveCompletion, MoveOutcome, play_cell, resolve_move, submit_move};

// Crate-level exports - Leaderboard
pub use ranking::{
    DEFAULT_RANKING_INTERVAL, RankingEntry, RankingPoller, RankingSource, RankingState,
    RankingView,
};

// Crate-level exports - Configuration
pub use config::{
    API_BASE_URL_ENV, CREDENTIAL_PATH_ENV, ClientConfig, ConfigError, default_credential_path,
};

// Crate-level exports - Terminal UI
pub use tui::{App, AppCommand, StatusTone, digit_cell, move_cursor, run_tui};
