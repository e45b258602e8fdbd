//! Application state and key handling.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument, warn};

use super::input::{digit_cell, move_cursor};
use crate::credential::{Bootstrap, CredentialLifecycle, LoginProvider, login_url};
use crate::game::SessionPhase;
use crate::moves::{MoveCompletion, MoveOutcome, resolve_move};
use crate::session::{GameSession, MoveTicket};

/// Work the event loop must do after a key press.
#[derive(Debug)]
pub enum AppCommand {
    /// Nothing to do beyond redrawing.
    None,
    /// Submit this move to the authority.
    Submit(MoveTicket),
    /// Refresh the leaderboard now.
    RefreshRanking,
}

/// Colour hint for the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    /// Logged out.
    Locked,
    /// Waiting for a game to start.
    Idle,
    /// Human to move.
    Playing,
    /// Human won.
    Won,
    /// AI won.
    Lost,
    /// Draw.
    Drawn,
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    session: GameSession,
    lifecycle: CredentialLifecycle,
    cursor: usize,
    notice: Option<String>,
    login_links: Vec<(LoginProvider, String)>,
    should_quit: bool,
}

impl App {
    /// Creates the application around an explicitly constructed session.
    #[instrument(skip(session))]
    pub fn new(session: GameSession, api_base_url: &str) -> Self {
        let login_links = LoginProvider::iter()
            .map(|provider| (provider, login_url(api_base_url, provider)))
            .collect();

        Self {
            session,
            lifecycle: CredentialLifecycle::new(),
            cursor: 4,
            notice: None,
            login_links,
            should_quit: false,
        }
    }

    /// Runs the one-shot startup credential check.
    pub fn bootstrap(
        &mut self,
        landing_url: Option<&str>,
        explicit_token: Option<&str>,
    ) -> Option<Bootstrap> {
        self.lifecycle
            .bootstrap(&mut self.session, landing_url, explicit_token)
    }

    /// Whether the startup credential check has completed.
    pub fn is_loaded(&self) -> bool {
        self.lifecycle.is_loaded()
    }

    /// Gets the session.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Cursor position (0-8).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Last error notice, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Redirect URLs for each login provider.
    pub fn login_links(&self) -> &[(LoginProvider, String)] {
        &self.login_links
    }

    /// Whether the user asked to quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Status line text and tone for the current session.
    pub fn status(&self) -> (&'static str, StatusTone) {
        if !self.session.has_credential() {
            return ("Please log in to play", StatusTone::Locked);
        }

        if self.session.is_move_in_flight() {
            return ("Waiting for the bot...", StatusTone::Playing);
        }

        match self.session.phase() {
            SessionPhase::InProgress => ("Your turn!", StatusTone::Playing),
            SessionPhase::Won => ("Congratulations! You won!", StatusTone::Won),
            SessionPhase::Lost => ("You lost to the bot", StatusTone::Lost),
            SessionPhase::Drawn => ("It's a draw!", StatusTone::Drawn),
            SessionPhase::NotStarted => ("Ready to play?", StatusTone::Idle),
        }
    }

    /// Label for the new-game action.
    pub fn reset_label(&self) -> &'static str {
        if !self.session.has_credential() {
            "Please log in first"
        } else if *self.session.phase() == SessionPhase::InProgress {
            "Game in progress..."
        } else {
            "n: Start a new game"
        }
    }

    /// Handles a key press.
    #[instrument(skip(self))]
    pub fn handle_key(&mut self, key: KeyEvent) -> AppCommand {
        // Crossterm reports both press and release on some platforms.
        if key.kind == KeyEventKind::Release {
            return AppCommand::None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                info!("User quit");
                self.should_quit = true;
                AppCommand::None
            }
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
                self.cursor = move_cursor(self.cursor, key.code);
                AppCommand::None
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.select_cell(self.cursor),
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.new_game();
                AppCommand::None
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                self.logout();
                AppCommand::None
            }
            KeyCode::Char('r') | KeyCode::Char('R') => AppCommand::RefreshRanking,
            code => match digit_cell(code) {
                Some(index) => {
                    self.cursor = index;
                    self.select_cell(index)
                }
                None => AppCommand::None,
            },
        }
    }

    /// Tries to play `index`. Illegal moves are ignored without a network
    /// call.
    #[instrument(skip(self))]
    pub fn select_cell(&mut self, index: usize) -> AppCommand {
        match self.session.begin_move(index) {
            Ok(ticket) => {
                self.notice = None;
                AppCommand::Submit(ticket)
            }
            Err(rejection) => {
                debug!(%rejection, "Cell not playable");
                AppCommand::None
            }
        }
    }

    /// Starts a new game when the UI allows it.
    #[instrument(skip(self))]
    pub fn new_game(&mut self) {
        if !self.session.can_reset() {
            debug!("New game not available");
            return;
        }
        self.session.reset();
        self.notice = None;
    }

    /// Logs out, leaving nothing of the previous player on screen.
    #[instrument(skip(self))]
    pub fn logout(&mut self) {
        if !self.session.has_credential() {
            return;
        }
        self.session.clear_credential();
        self.notice = None;
        info!("Logged out");
    }

    /// Applies a finished move submission.
    #[instrument(skip_all)]
    pub fn handle_completion(&mut self, completion: MoveCompletion) {
        match resolve_move(&mut self.session, completion) {
            MoveOutcome::Applied(phase) => {
                debug!(%phase, "Board updated");
            }
            MoveOutcome::Discarded(rejection) => {
                debug!(%rejection, "Late move response ignored");
            }
            MoveOutcome::Failed(error) => {
                warn!(error = %error, "Move failed");
                self.notice = Some(format!(
                    "Move failed: {}. Press Enter to retry.",
                    error.message
                ));
            }
        }
    }
}
