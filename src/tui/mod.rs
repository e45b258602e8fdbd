//! Terminal UI for the OX client.

mod app;
mod input;
mod ui;

pub use app::{App, AppCommand, StatusTone};
pub use input::{digit_cell, move_cursor};

use std::io::{self, Stdout};
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::credential::FileCredentialStore;
use crate::moves::{MoveCompletion, submit_move};
use crate::ranking::RankingPoller;
use crate::session::GameSession;

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Runs the interactive client until the user quits.
///
/// `landing_url` is the address the login redirect finished on; the
/// credential it carries is adopted once at startup. `token` is a credential
/// pasted directly.
pub async fn run_tui(
    config: &ClientConfig,
    landing_url: Option<String>,
    token: Option<String>,
) -> Result<()> {
    // Log to a file so tracing output does not corrupt the screen
    let log_file = std::fs::File::create(config.log_file())?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init();

    info!(api_base_url = %config.api_base_url(), "Starting Strictly OX TUI");

    let client = ApiClient::new(config.api_base_url())?;
    let store = FileCredentialStore::new(config.resolved_credential_path());
    let session = GameSession::new(Box::new(store));
    let mut app = App::new(session, config.api_base_url());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(
        &mut terminal,
        &mut app,
        client,
        config,
        landing_url.as_deref(),
        token.as_deref(),
    )
    .await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "TUI loop error");
    }
    info!("Strictly OX TUI stopped");

    res
}

#[instrument(skip_all)]
async fn run_app(
    terminal: &mut Tui,
    app: &mut App,
    client: ApiClient,
    config: &ClientConfig,
    landing_url: Option<&str>,
    token: Option<&str>,
) -> Result<()> {
    terminal.draw(|frame| ui::draw_loading(frame))?;

    if let Some(bootstrap) = app.bootstrap(landing_url, token) {
        info!(source = %bootstrap.source(), "Credential check finished");
        if let Some(cleaned) = bootstrap.cleaned_location() {
            debug!(location = %cleaned, "Landing URL without credential");
        }
    }

    let poller = RankingPoller::spawn(client.clone(), config.ranking_interval());
    let mut ranking_rx = poller.subscribe();
    let mut ranking_live = true;

    let (move_tx, mut move_rx) = mpsc::unbounded_channel::<MoveCompletion>();
    let mut events = EventStream::new();

    loop {
        let ranking = ranking_rx.borrow_and_update().clone();
        terminal.draw(|frame| ui::draw(frame, app, &ranking))?;

        tokio::select! {
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        match app.handle_key(key) {
                            AppCommand::Submit(ticket) => {
                                let client = client.clone();
                                let tx = move_tx.clone();
                                tokio::spawn(async move {
                                    let completion = submit_move(&client, ticket).await;
                                    if tx.send(completion).is_err() {
                                        debug!("UI closed before move completed");
                                    }
                                });
                            }
                            AppCommand::RefreshRanking => poller.refresh_now(),
                            AppCommand::None => {}
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "Terminal event error");
                        return Err(e.into());
                    }
                    None => {
                        info!("Terminal event stream closed");
                        return Ok(());
                    }
                }
            }
            Some(completion) = move_rx.recv() => {
                app.handle_completion(completion);
            }
            changed = ranking_rx.changed(), if ranking_live => {
                if changed.is_err() {
                    warn!("Leaderboard poller stopped");
                    ranking_live = false;
                }
            }
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
