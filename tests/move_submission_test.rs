//! Tests for move submission against a scripted authority.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use strictly_ox::{
    ApiError, ApiErrorKind, AuthorityOutcome, Board, Cell, GameSession, Mark,
    MemoryCredentialStore, MoveAuthority, MoveCompletion, MoveOutcome, MoveRejection, MoveResult,
    MoveTicket, SessionPhase, play_cell, resolve_move, submit_move,
};

/// Authority double that replays scripted answers and counts calls.
#[derive(Default)]
struct ScriptedAuthority {
    calls: AtomicUsize,
    answers: Mutex<Vec<Result<MoveResult, ApiError>>>,
    seen: Mutex<Vec<(usize, String)>>,
}

impl ScriptedAuthority {
    fn answering(answers: Vec<Result<MoveResult, ApiError>>) -> Self {
        let mut answers = answers;
        answers.reverse();
        Self {
            answers: Mutex::new(answers),
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MoveAuthority for ScriptedAuthority {
    async fn submit_move(&self, ticket: &MoveTicket) -> Result<MoveResult, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((*ticket.index(), ticket.credential().expose().to_string()));
        self.answers
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(ApiError::new(ApiErrorKind::Transport, "no answer scripted")))
    }
}

fn board_with(marks: &[(usize, Mark)]) -> Board {
    let mut cells = [Cell::Empty; 9];
    for (index, mark) in marks {
        cells[*index] = Cell::Occupied(*mark);
    }
    Board::from_cells(cells)
}

fn running_session() -> GameSession {
    let mut session = GameSession::new(Box::new(MemoryCredentialStore::new()));
    session.load_credential("tok-7").unwrap();
    session.reset();
    session
}

#[tokio::test]
async fn test_confirmed_move_replaces_board() {
    let reply = board_with(&[(4, Mark::X), (0, Mark::O)]);
    let authority = ScriptedAuthority::answering(vec![Ok(MoveResult::new(
        reply,
        AuthorityOutcome::parse(""),
        None,
        None,
    ))]);
    let mut session = running_session();

    let outcome = play_cell(&mut session, &authority, 4).await.unwrap();

    assert!(matches!(outcome, MoveOutcome::Applied(SessionPhase::InProgress)));
    assert_eq!(*session.board(), reply);
    assert_eq!(authority.calls(), 1);
    assert_eq!(
        authority.seen.lock().unwrap().as_slice(),
        &[(4, "tok-7".to_string())]
    );
}

#[tokio::test]
async fn test_occupied_cell_makes_no_call() {
    let reply = board_with(&[(4, Mark::X), (0, Mark::O)]);
    let authority = ScriptedAuthority::answering(vec![Ok(MoveResult::new(
        reply,
        AuthorityOutcome::parse(""),
        None,
        None,
    ))]);
    let mut session = running_session();

    play_cell(&mut session, &authority, 4).await.unwrap();
    let again = play_cell(&mut session, &authority, 4).await;
    let ai_cell = play_cell(&mut session, &authority, 0).await;

    assert_eq!(again.unwrap_err(), MoveRejection::CellOccupied(4));
    assert_eq!(ai_cell.unwrap_err(), MoveRejection::CellOccupied(0));
    assert_eq!(authority.calls(), 1);
    assert_eq!(*session.board(), reply);
}

#[tokio::test]
async fn test_no_call_without_credential_or_running_game() {
    let authority = ScriptedAuthority::default();

    let mut logged_out = GameSession::new(Box::new(MemoryCredentialStore::new()));
    assert_eq!(
        play_cell(&mut logged_out, &authority, 0).await.unwrap_err(),
        MoveRejection::NoCredential
    );

    let mut idle = GameSession::new(Box::new(MemoryCredentialStore::new()));
    idle.load_credential("tok").unwrap();
    assert_eq!(
        play_cell(&mut idle, &authority, 0).await.unwrap_err(),
        MoveRejection::NotInProgress(SessionPhase::NotStarted)
    );

    assert_eq!(authority.calls(), 0);
}

#[tokio::test]
async fn test_no_call_after_game_over() {
    let authority = ScriptedAuthority::answering(vec![Ok(MoveResult::new(
        board_with(&[(0, Mark::X), (1, Mark::X), (2, Mark::X), (3, Mark::O), (4, Mark::O)]),
        AuthorityOutcome::parse("X"),
        Some(10),
        Some(1),
    ))]);
    let mut session = running_session();

    play_cell(&mut session, &authority, 2).await.unwrap();
    assert_eq!(*session.phase(), SessionPhase::Won);

    let rejected = play_cell(&mut session, &authority, 8).await;
    assert_eq!(
        rejected.unwrap_err(),
        MoveRejection::NotInProgress(SessionPhase::Won)
    );
    assert_eq!(authority.calls(), 1);
    assert_eq!(*session.score(), 10);
    assert_eq!(*session.streak(), 1);
}

#[tokio::test]
async fn test_failed_move_leaves_state_unchanged() {
    let authority = ScriptedAuthority::answering(vec![Err(ApiError::new(
        ApiErrorKind::Status(500),
        "Internal Server Error",
    ))]);
    let mut session = running_session();

    let outcome = play_cell(&mut session, &authority, 4).await.unwrap();

    match outcome {
        MoveOutcome::Failed(error) => assert_eq!(error.kind, ApiErrorKind::Status(500)),
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(session.board().is_clear());
    assert_eq!(*session.phase(), SessionPhase::InProgress);
    assert!(!session.is_move_in_flight());
    assert!(session.is_cell_playable(4));
}

#[tokio::test]
async fn test_late_answer_after_reset_is_discarded() {
    let authority = ScriptedAuthority::answering(vec![Ok(MoveResult::new(
        board_with(&[(0, Mark::X), (4, Mark::O)]),
        AuthorityOutcome::parse(""),
        None,
        None,
    ))]);
    let mut session = running_session();

    let ticket = session.begin_move(0).unwrap();
    let completion = submit_move(&authority, ticket).await;
    session.reset();

    let outcome = resolve_move(&mut session, completion);
    assert!(matches!(outcome, MoveOutcome::Discarded(_)));
    assert!(session.board().is_clear());
    assert!(!session.is_move_in_flight());
}

#[tokio::test]
async fn test_second_move_waits_for_first() {
    let authority = ScriptedAuthority::default();
    let mut session = running_session();

    let first = session.begin_move(0).unwrap();
    assert_eq!(session.begin_move(1), Err(MoveRejection::MoveInFlight));

    let completion = submit_move(&authority, first).await;
    assert!(matches!(completion, MoveCompletion::Failed { .. }));
    resolve_move(&mut session, completion);

    assert!(session.begin_move(1).is_ok());
}
