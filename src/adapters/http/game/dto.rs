//! HTTP DTOs for the game endpoints.
//!
//! Wire names are camelCase to match the browser client.

use serde::{Deserialize, Serialize};

use crate::application::GameStateView;
use crate::domain::game::{GameId, TranscriptMessage};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to set the game's theme.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeRequest {
    pub game_id: GameId,
    pub theme: String,
}

/// Request to start the next clip.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRequest {
    pub game_id: GameId,
}

/// Request to judge a guess (first or supplementary).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub game_id: GameId,
    pub user_answer: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGameResponse {
    pub game_id: GameId,
    pub presenter_text: String,
    pub game_state: GameStateView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeResponse {
    pub presenter_text: String,
    pub game_state: GameStateView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongResponse {
    pub presenter_text: String,
    pub track_url: String,
    pub game_state: GameStateView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub presenter_text: String,
    pub success: bool,
    pub points: u32,
    pub game_state: GameStateView,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<TranscriptMessage>,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: message.into(),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            code: "UPSTREAM_ERROR".to_string(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_request_deserializes_camel_case() {
        let id = GameId::new();
        let json = format!(r#"{{"gameId": "{id}", "userAnswer": "Africa by Toto"}}"#);
        let req: AnswerRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req.game_id, id);
        assert_eq!(req.user_answer, "Africa by Toto");
    }

    #[test]
    fn malformed_game_id_is_rejected() {
        let json = r#"{"gameId": "not-a-uuid", "theme": "80s"}"#;
        assert!(serde_json::from_str::<ThemeRequest>(json).is_err());
    }

    #[test]
    fn error_response_shapes() {
        let err = ErrorResponse::not_found("game not found");
        assert_eq!(err.code, "NOT_FOUND");
        let err = ErrorResponse::bad_gateway("oracle down");
        assert_eq!(err.code, "UPSTREAM_ERROR");
    }
}
