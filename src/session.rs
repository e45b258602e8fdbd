//! Client-side game session store.
//!
//! [`GameSession`] owns the board, phase, score/streak and credential for one
//! player. Every state change goes through the operations below; the
//! authority's move responses are applied only when they belong to the
//! current generation.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use tracing::{debug, info, instrument, warn};

use crate::credential::{Credential, CredentialStore};
use crate::game::{AuthorityOutcome, BOARD_CELLS, Board, SessionPhase};

/// Why a move could not be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MoveRejection {
    /// No credential is loaded.
    #[display("no credential")]
    NoCredential,
    /// The session is not in progress.
    #[display("game is {}", _0)]
    NotInProgress(#[error(not(source))] SessionPhase),
    /// The target cell is already occupied.
    #[display("cell {} is occupied", _0)]
    CellOccupied(#[error(not(source))] usize),
    /// The index is not 0-8.
    #[display("cell {} is off the board", _0)]
    OutOfRange(#[error(not(source))] usize),
    /// A previous move has not been answered yet.
    #[display("a move is already in flight")]
    MoveInFlight,
}

/// Why a move response was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum ApplyRejection {
    /// The response belongs to a session generation that has since been
    /// reset or logged out.
    #[display("stale response from generation {} (current {})", received, current)]
    Stale {
        /// Generation the move was submitted under.
        received: u64,
        /// Current generation.
        current: u64,
    },
    /// The session is not accepting move results.
    #[display("session is {}", _0)]
    NotInProgress(#[error(not(source))] SessionPhase),
}

/// Returned by [`GameSession::load_credential`] for an empty token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("no credential")]
pub struct NoCredential;

/// Authority-confirmed result of one move.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct MoveResult {
    /// Replacement board.
    board: Board,
    /// Outcome code.
    outcome: AuthorityOutcome,
    /// Total score, when the authority reports one.
    score: Option<u32>,
    /// Consecutive wins, when the authority reports them.
    streak: Option<u32>,
}

/// Everything a submission needs, captured when the move starts.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct MoveTicket {
    /// Session generation the move belongs to.
    generation: u64,
    /// Target cell (0-8).
    index: usize,
    /// Board as it was when the move was chosen.
    board: Board,
    /// Credential to authorize the request with.
    credential: Credential,
}

/// State of one client session.
///
/// Created once at startup with [`GameSession::new`] and passed by reference
/// to whatever drives the UI.
#[derive(Debug, Getters)]
pub struct GameSession {
    /// Current board.
    board: Board,
    /// Current phase.
    phase: SessionPhase,
    /// Total score as last reported by the authority.
    score: u32,
    /// Consecutive wins as last reported by the authority.
    streak: u32,
    /// Identity credential, if logged in.
    credential: Option<Credential>,
    /// Incremented by every reset and logout.
    generation: u64,
    /// Generation of the move awaiting a response.
    #[getter(skip)]
    in_flight: Option<u64>,
    #[getter(skip)]
    store: Box<dyn CredentialStore>,
}

impl GameSession {
    /// Creates a session in its initial state: empty board, `NotStarted`,
    /// zero score and streak, no credential.
    #[instrument(skip(store))]
    pub fn new(store: Box<dyn CredentialStore>) -> Self {
        info!("Creating game session");
        Self {
            board: Board::new(),
            phase: SessionPhase::NotStarted,
            score: 0,
            streak: 0,
            credential: None,
            generation: 0,
            in_flight: None,
            store,
        }
    }

    /// Returns `true` if a credential is loaded.
    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Returns `true` while a submitted move awaits its response.
    pub fn is_move_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Adopts `token` as the session credential and persists it.
    ///
    /// Does not change the phase. An empty or whitespace token is rejected
    /// and leaves the session untouched. A failure to persist is logged; the
    /// in-memory credential is still adopted.
    #[instrument(skip(self, token), fields(generation = self.generation))]
    pub fn load_credential(&mut self, token: &str) -> Result<(), NoCredential> {
        let credential = Credential::parse(token).ok_or_else(|| {
            debug!("Rejected empty credential");
            NoCredential
        })?;

        if let Err(e) = self.store.save(&credential) {
            warn!(error = %e, "Failed to persist credential");
        }

        self.credential = Some(credential);
        info!("Credential loaded");
        Ok(())
    }

    /// Adopts the persisted credential, if there is one.
    ///
    /// Returns `true` if a credential was recovered.
    #[instrument(skip(self))]
    pub fn recover_credential(&mut self) -> bool {
        match self.store.load() {
            Ok(Some(credential)) => {
                self.credential = Some(credential);
                info!("Recovered stored credential");
                true
            }
            Ok(None) => {
                debug!("No stored credential to recover");
                false
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stored credential");
                false
            }
        }
    }

    /// Logs out: drops the credential, returns every field to its initial
    /// value and evicts the persisted copy.
    ///
    /// Bumps the generation so responses to moves made before logout are
    /// discarded.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn clear_credential(&mut self) {
        self.credential = None;
        self.board = Board::new();
        self.phase = SessionPhase::NotStarted;
        self.score = 0;
        self.streak = 0;
        self.in_flight = None;
        self.generation += 1;

        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to evict stored credential");
        }

        info!(generation = self.generation, "Credential cleared, session reset");
    }

    /// Returns `true` when [`GameSession::reset`] would start a new game and
    /// the UI should offer it: logged in and no game running.
    pub fn can_reset(&self) -> bool {
        self.has_credential() && self.phase != SessionPhase::InProgress
    }

    /// Starts a new game: empty board, `InProgress`, next generation.
    ///
    /// Without a credential this is a no-op and returns `false`. Score and
    /// streak carry over.
    #[instrument(skip(self), fields(generation = self.generation, phase = %self.phase))]
    pub fn reset(&mut self) -> bool {
        if !self.has_credential() {
            debug!("Reset ignored without credential");
            return false;
        }

        self.board = Board::new();
        self.phase = SessionPhase::InProgress;
        self.in_flight = None;
        self.generation += 1;

        info!(generation = self.generation, "New game started");
        true
    }

    /// Checks whether the cell at `index` may be played right now.
    pub fn is_cell_playable(&self, index: usize) -> bool {
        self.check_move(index).is_ok()
    }

    fn check_move(&self, index: usize) -> Result<&Credential, MoveRejection> {
        let credential = self
            .credential
            .as_ref()
            .ok_or(MoveRejection::NoCredential)?;

        if self.phase != SessionPhase::InProgress {
            return Err(MoveRejection::NotInProgress(self.phase));
        }

        if index >= BOARD_CELLS {
            return Err(MoveRejection::OutOfRange(index));
        }

        if !self.board.is_empty_at(index) {
            return Err(MoveRejection::CellOccupied(index));
        }

        if self.in_flight.is_some() {
            return Err(MoveRejection::MoveInFlight);
        }

        Ok(credential)
    }

    /// Starts a move at `index` and returns the ticket to submit.
    ///
    /// The board is not touched; it only changes once the authority
    /// answers. Until then further moves are rejected with
    /// [`MoveRejection::MoveInFlight`].
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn begin_move(&mut self, index: usize) -> Result<MoveTicket, MoveRejection> {
        let credential = self.check_move(index).map_err(|rejection| {
            debug!(%rejection, "Move rejected locally");
            rejection
        })?;

        let ticket = MoveTicket {
            generation: self.generation,
            index,
            board: self.board,
            credential: credential.clone(),
        };
        self.in_flight = Some(self.generation);

        debug!("Move started");
        Ok(ticket)
    }

    /// Releases the in-flight marker after a failed submission. The board,
    /// phase and score stay as they were.
    #[instrument(skip(self), fields(current = self.generation))]
    pub fn abandon_move(&mut self, generation: u64) {
        if self.in_flight == Some(generation) {
            self.in_flight = None;
            debug!("In-flight move released");
        }
    }

    /// Applies an authority-confirmed move result submitted under
    /// `generation`.
    ///
    /// Replaces the board, maps the outcome to a phase and, when a score is
    /// present, overwrites score and streak. Responses from an older
    /// generation are dropped. Re-applying the result that ended the game is
    /// a no-op; any other result in a finished game is refused.
    #[instrument(skip(self, result), fields(current = self.generation, outcome = %result.outcome))]
    pub fn apply_move_result(
        &mut self,
        generation: u64,
        result: MoveResult,
    ) -> Result<SessionPhase, ApplyRejection> {
        if generation != self.generation {
            warn!(received = generation, "Discarding stale move response");
            return Err(ApplyRejection::Stale {
                received: generation,
                current: self.generation,
            });
        }

        let next_phase = result.outcome.phase();

        match self.phase {
            SessionPhase::InProgress => {}
            phase
                if phase.is_terminal() && phase == next_phase && self.board == result.board =>
            {
                debug!("Move result already applied");
                return Ok(phase);
            }
            phase => {
                warn!(%phase, "Refusing move result outside a running game");
                return Err(ApplyRejection::NotInProgress(phase));
            }
        }

        self.board = result.board;
        self.phase = next_phase;
        if let Some(score) = result.score {
            self.score = score;
            if let Some(streak) = result.streak {
                self.streak = streak;
            }
        }
        self.in_flight = None;

        info!(
            phase = %self.phase,
            score = self.score,
            streak = self.streak,
            "Move result applied"
        );
        Ok(self.phase)
    }
}
