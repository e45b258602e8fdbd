//! Request and response bodies for the game API.

use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::game::{AuthorityOutcome, Board};
use crate::session::MoveResult;

/// Body of `POST /move`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, new)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    /// Board the move was chosen on.
    pub board: Board,
    /// Target cell (0-8).
    pub player_index: usize,
}

/// Body returned by `POST /move`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    /// Board after the human's move and the AI's reply.
    pub board: Board,
    /// Outcome code: `"X"`, `"O"`, `"DRAW"` or anything else while running.
    #[serde(default)]
    pub game_status: Option<String>,
    /// Total score; `null` while the game is running.
    #[serde(default)]
    pub score: Option<u32>,
    /// Consecutive wins.
    #[serde(default)]
    pub consecutive_wins: Option<u32>,
}

impl From<MoveResponse> for MoveResult {
    fn from(response: MoveResponse) -> Self {
        let outcome = AuthorityOutcome::parse(response.game_status.as_deref().unwrap_or_default());
        MoveResult::new(
            response.board,
            outcome,
            response.score,
            response.consecutive_wins,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Cell, Mark, SessionPhase};

    #[test]
    fn test_move_request_shape() {
        let request = MoveRequest::new(Board::new(), 4);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "board": [null, null, null, null, null, null, null, null, null],
                "playerIndex": 4
            })
        );
    }

    #[test]
    fn test_move_response_win() {
        let body = r#"{
            "board": ["X","X","X","O","O",null,null,null,null],
            "gameStatus": "X",
            "score": 10,
            "consecutiveWins": 1
        }"#;
        let result: MoveResult = serde_json::from_str::<MoveResponse>(body).unwrap().into();
        assert_eq!(result.outcome().phase(), SessionPhase::Won);
        assert_eq!(*result.score(), Some(10));
        assert_eq!(*result.streak(), Some(1));
        assert_eq!(result.board().get(0), Some(Cell::Occupied(Mark::X)));
    }

    #[test]
    fn test_move_response_running_with_null_score() {
        let body = r#"{
            "board": ["X",null,null,null,"O",null,null,null,null],
            "gameStatus": null,
            "score": null,
            "consecutiveWins": 0
        }"#;
        let result: MoveResult = serde_json::from_str::<MoveResponse>(body).unwrap().into();
        assert_eq!(result.outcome().phase(), SessionPhase::InProgress);
        assert_eq!(*result.score(), None);
    }
}
