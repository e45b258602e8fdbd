//! Leaderboard polling.
//!
//! [`RankingPoller`] fetches the ranking once on start and then on a fixed
//! interval, publishing a [`RankingState`] through a `watch` channel. It is
//! independent of the game session. Each finished fetch replaces the
//! displayed result entirely.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiClient, ApiError};

/// Default refresh interval.
pub const DEFAULT_RANKING_INTERVAL: Duration = Duration::from_secs(60);

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    /// Player's display name.
    display_name: String,
    /// Total score.
    total_score: i64,
    /// Consecutive wins.
    #[serde(rename = "consecutiveWins", default)]
    streak: u32,
}

impl RankingEntry {
    /// Rank badge for the 1-based `rank`: medals for the podium, `"n."` below.
    pub fn medal(rank: usize) -> String {
        match rank {
            1 => "🥇".to_string(),
            2 => "🥈".to_string(),
            3 => "🥉".to_string(),
            n => format!("{}.", n),
        }
    }
}

/// Source of ranking data.
#[async_trait]
pub trait RankingSource: Send + Sync + 'static {
    /// Fetches the ranking in authority order.
    async fn fetch_ranking(&self) -> Result<Vec<RankingEntry>, ApiError>;
}

#[async_trait]
impl RankingSource for ApiClient {
    async fn fetch_ranking(&self) -> Result<Vec<RankingEntry>, ApiError> {
        self.leaderboard(None).await
    }
}

/// What the leaderboard panel shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RankingView {
    /// No fetch has finished yet.
    #[default]
    Loading,
    /// The last fetch failed. Kept until a fetch succeeds.
    Failed(String),
    /// The last fetch succeeded; possibly with no players.
    Ready(Vec<RankingEntry>),
}

/// Leaderboard display state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Getters)]
pub struct RankingState {
    /// Current view.
    view: RankingView,
    /// A fetch is running.
    refreshing: bool,
    /// Number of fetches that have finished.
    completed: u64,
}

impl RankingState {
    /// Marks a fetch as started. The current view stays visible.
    pub fn begin_fetch(&mut self) {
        self.refreshing = true;
    }

    /// Records a finished fetch, replacing the view.
    #[instrument(skip_all)]
    pub fn finish_fetch(&mut self, result: Result<Vec<RankingEntry>, ApiError>) {
        self.view = match result {
            Ok(entries) => {
                debug!(count = entries.len(), "Ranking updated");
                RankingView::Ready(entries)
            }
            Err(error) => {
                warn!(error = %error, "Failed to fetch leaderboard");
                RankingView::Failed(format!("Unable to load the leaderboard: {}", error.message))
            }
        };
        self.refreshing = false;
        self.completed += 1;
    }
}

/// Background leaderboard poller.
///
/// The polling task lives as long as this handle; dropping it stops the
/// timer.
#[derive(Debug)]
pub struct RankingPoller {
    state: watch::Receiver<RankingState>,
    refresh: Arc<Notify>,
    task: JoinHandle<()>,
}

impl RankingPoller {
    /// Spawns the polling task. The first fetch starts immediately.
    #[instrument(skip(source))]
    pub fn spawn<S: RankingSource>(source: S, interval: Duration) -> Self {
        info!(interval_secs = interval.as_secs(), "Starting leaderboard poller");

        let (tx, rx) = watch::channel(RankingState::default());
        let refresh = Arc::new(Notify::new());
        let task = tokio::spawn(poll_loop(source, interval, tx, Arc::clone(&refresh)));

        Self {
            state: rx,
            refresh,
            task,
        }
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<RankingState> {
        self.state.clone()
    }

    /// Returns a copy of the latest state.
    pub fn current(&self) -> RankingState {
        self.state.borrow().clone()
    }

    /// Requests a fetch now instead of waiting for the next tick.
    #[instrument(skip(self))]
    pub fn refresh_now(&self) {
        debug!("Manual leaderboard refresh requested");
        self.refresh.notify_one();
    }
}

impl Drop for RankingPoller {
    fn drop(&mut self) {
        debug!("Stopping leaderboard poller");
        self.task.abort();
    }
}

async fn poll_loop<S: RankingSource>(
    source: S,
    interval: Duration,
    tx: watch::Sender<RankingState>,
    refresh: Arc<Notify>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = refresh.notified() => {}
        }

        tx.send_modify(RankingState::begin_fetch);
        let result = source.fetch_ranking().await;
        tx.send_modify(|state| state.finish_fetch(result));
    }
}
