//! Move submission: local legality, the authority round trip, and applying
//! the confirmed result.
//!
//! A move is split in three so the network call can run in its own task:
//! [`GameSession::begin_move`] checks legality and issues a ticket,
//! [`submit_move`] talks to the authority, and [`resolve_move`] applies the
//! answer back on the session owner. [`play_cell`] runs all three in line.

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiClient, ApiError, MoveRequest};
use crate::game::SessionPhase;
use crate::session::{ApplyRejection, GameSession, MoveRejection, MoveResult, MoveTicket};

/// Something that can confirm moves: the real authority or a test double.
#[async_trait]
pub trait MoveAuthority: Send + Sync {
    /// Submits the move described by `ticket` and returns the confirmed
    /// result.
    async fn submit_move(&self, ticket: &MoveTicket) -> Result<MoveResult, ApiError>;
}

#[async_trait]
impl MoveAuthority for ApiClient {
    async fn submit_move(&self, ticket: &MoveTicket) -> Result<MoveResult, ApiError> {
        let request = MoveRequest::new(*ticket.board(), *ticket.index());
        let response = self.post_move(ticket.credential(), &request).await?;
        Ok(response.into())
    }
}

/// Answer to a submitted move, tagged with its session generation.
#[derive(Debug, Clone)]
pub enum MoveCompletion {
    /// The authority confirmed the move.
    Confirmed {
        /// Generation the move was submitted under.
        generation: u64,
        /// Confirmed result.
        result: MoveResult,
    },
    /// Transport or authority failure.
    Failed {
        /// Generation the move was submitted under.
        generation: u64,
        /// What went wrong.
        error: ApiError,
    },
}

/// What happened to a completed move once it reached the session.
#[derive(Debug, Clone)]
pub enum MoveOutcome {
    /// Applied; the session is now in this phase.
    Applied(SessionPhase),
    /// Dropped without touching the session.
    Discarded(ApplyRejection),
    /// The submission failed; the session still shows the prior state.
    Failed(ApiError),
}

/// Sends the ticket's move to `authority`. Never touches the session.
#[instrument(skip_all, fields(generation = *ticket.generation(), index = *ticket.index()))]
pub async fn submit_move<A>(authority: &A, ticket: MoveTicket) -> MoveCompletion
where
    A: MoveAuthority + ?Sized,
{
    let generation = *ticket.generation();
    match authority.submit_move(&ticket).await {
        Ok(result) => {
            debug!(outcome = %result.outcome(), "Move confirmed by authority");
            MoveCompletion::Confirmed { generation, result }
        }
        Err(error) => {
            warn!(error = %error, "Move submission failed");
            MoveCompletion::Failed { generation, error }
        }
    }
}

/// Applies a completed move to `session`.
///
/// Failures leave the board as it was and only release the in-flight
/// marker; stale answers are dropped.
#[instrument(skip_all)]
pub fn resolve_move(session: &mut GameSession, completion: MoveCompletion) -> MoveOutcome {
    match completion {
        MoveCompletion::Confirmed { generation, result } => {
            match session.apply_move_result(generation, result) {
                Ok(phase) => MoveOutcome::Applied(phase),
                Err(rejection) => {
                    session.abandon_move(generation);
                    MoveOutcome::Discarded(rejection)
                }
            }
        }
        MoveCompletion::Failed { generation, error } => {
            session.abandon_move(generation);
            MoveOutcome::Failed(error)
        }
    }
}

/// Plays cell `index`: checks legality, submits, and applies the answer.
///
/// An illegal move is rejected before any network call.
#[instrument(skip(session, authority))]
pub async fn play_cell<A>(
    session: &mut GameSession,
    authority: &A,
    index: usize,
) -> Result<MoveOutcome, MoveRejection>
where
    A: MoveAuthority + ?Sized,
{
    let ticket = session.begin_move(index)?;
    let completion = submit_move(authority, ticket).await;
    let outcome = resolve_move(session, completion);
    info!(?outcome, "Move resolved");
    Ok(outcome)
}
