//! Tests for the background leaderboard poller.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use strictly_ox::{
    ApiError, ApiErrorKind, DEFAULT_RANKING_INTERVAL, RankingEntry, RankingPoller, RankingSource,
    RankingState, RankingView,
};

/// Ranking source that replays scripted answers, then repeats the last one.
#[derive(Clone, Default)]
struct ScriptedSource {
    calls: Arc<AtomicUsize>,
    answers: Arc<Mutex<Vec<Result<Vec<RankingEntry>, ApiError>>>>,
}

impl ScriptedSource {
    fn answering(answers: Vec<Result<Vec<RankingEntry>, ApiError>>) -> Self {
        Self {
            calls: Arc::default(),
            answers: Arc::new(Mutex::new(answers)),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RankingSource for ScriptedSource {
    async fn fetch_ranking(&self) -> Result<Vec<RankingEntry>, ApiError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let answers = self.answers.lock().unwrap();
        answers
            .get(call)
            .or_else(|| answers.last())
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

fn entry(name: &str, score: i64, streak: u32) -> RankingEntry {
    RankingEntry::new(name.to_string(), score, streak)
}

/// Waits until the poller has finished at least `count` fetches.
async fn settled(poller: &RankingPoller, count: u64) -> RankingState {
    let mut rx = poller.subscribe();
    rx.wait_for(|state| *state.completed() >= count)
        .await
        .unwrap()
        .clone()
}

#[tokio::test(start_paused = true)]
async fn test_first_fetch_is_immediate() {
    let source = ScriptedSource::answering(vec![Ok(vec![
        entry("Somchai", 42, 3),
        entry("Malee", 17, 0),
    ])]);
    let poller = RankingPoller::spawn(source.clone(), DEFAULT_RANKING_INTERVAL);

    assert_eq!(*poller.current().view(), RankingView::Loading);

    let state = settled(&poller, 1).await;
    match state.view() {
        RankingView::Ready(entries) => {
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0].display_name(), "Somchai");
            assert_eq!(entries[1].display_name(), "Malee");
        }
        other => panic!("expected ranking, got {:?}", other),
    }
    assert!(!*state.refreshing());
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_empty_ranking_is_ready_not_error() {
    let source = ScriptedSource::answering(vec![Ok(Vec::new())]);
    let poller = RankingPoller::spawn(source, DEFAULT_RANKING_INTERVAL);

    let state = settled(&poller, 1).await;
    assert_eq!(*state.view(), RankingView::Ready(Vec::new()));
}

#[tokio::test(start_paused = true)]
async fn test_error_then_recovery_on_next_tick() {
    let source = ScriptedSource::answering(vec![
        Err(ApiError::new(ApiErrorKind::Transport, "connection refused")),
        Ok(vec![entry("Somchai", 42, 3)]),
    ]);
    let poller = RankingPoller::spawn(source.clone(), DEFAULT_RANKING_INTERVAL);

    let failed = settled(&poller, 1).await;
    match failed.view() {
        RankingView::Failed(message) => {
            assert!(message.starts_with("Unable to load the leaderboard"));
        }
        other => panic!("expected failure, got {:?}", other),
    }

    tokio::time::advance(Duration::from_secs(60)).await;
    let recovered = settled(&poller, 2).await;
    assert_eq!(
        *recovered.view(),
        RankingView::Ready(vec![entry("Somchai", 42, 3)])
    );
    assert_eq!(source.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_refetches_every_interval() {
    let source = ScriptedSource::answering(vec![Ok(vec![entry("Malee", 1, 0)])]);
    let poller = RankingPoller::spawn(source.clone(), Duration::from_secs(60));

    settled(&poller, 1).await;
    tokio::time::advance(Duration::from_secs(30)).await;
    tokio::task::yield_now().await;
    assert_eq!(source.calls(), 1);

    tokio::time::advance(Duration::from_secs(30)).await;
    settled(&poller, 2).await;

    tokio::time::advance(Duration::from_secs(60)).await;
    settled(&poller, 3).await;
    assert_eq!(source.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_now_skips_the_wait() {
    let source = ScriptedSource::answering(vec![Ok(Vec::new())]);
    let poller = RankingPoller::spawn(source.clone(), Duration::from_secs(60));

    settled(&poller, 1).await;
    poller.refresh_now();
    settled(&poller, 2).await;
    assert_eq!(source.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_drop_stops_polling() {
    let source = ScriptedSource::answering(vec![Ok(Vec::new())]);
    let poller = RankingPoller::spawn(source.clone(), Duration::from_secs(60));

    settled(&poller, 1).await;
    drop(poller);

    tokio::time::advance(Duration::from_secs(600)).await;
    tokio::task::yield_now().await;
    assert_eq!(source.calls(), 1);
}
