//! HTTP handlers for the game endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::GameService;
use crate::domain::game::{GameError, GameId};

use super::dto::{
    AnswerRequest, AnswerResponse, ErrorResponse, HistoryResponse, SongRequest,
    StartGameResponse, SongResponse, ThemeRequest, ThemeResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct GameHandlers {
    service: Arc<GameService>,
}

impl GameHandlers {
    pub fn new(service: Arc<GameService>) -> Self {
        Self { service }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/game/start - Create a session and greet the player
pub async fn start_game(State(handlers): State<GameHandlers>) -> Response {
    match handlers.service.start_game().await {
        Ok(started) => (
            StatusCode::CREATED,
            Json(StartGameResponse {
                game_id: started.game_id,
                presenter_text: started.presenter_text,
                game_state: started.state,
            }),
        )
            .into_response(),
        Err(e) => handle_game_error(e),
    }
}

/// POST /api/game/theme - Set the session's theme
pub async fn choose_theme(
    State(handlers): State<GameHandlers>,
    Json(req): Json<ThemeRequest>,
) -> Response {
    match handlers.service.choose_theme(req.game_id, &req.theme).await {
        Ok(chosen) => (
            StatusCode::OK,
            Json(ThemeResponse {
                presenter_text: chosen.presenter_text,
                game_state: chosen.state,
            }),
        )
            .into_response(),
        Err(e) => handle_game_error(e),
    }
}

/// POST /api/game/song - Select and commit the next clip
pub async fn start_song(
    State(handlers): State<GameHandlers>,
    Json(req): Json<SongRequest>,
) -> Response {
    match handlers.service.start_song(req.game_id).await {
        Ok(song) => (
            StatusCode::OK,
            Json(SongResponse {
                presenter_text: song.presenter_text,
                track_url: song.track_url,
                game_state: song.state,
            }),
        )
            .into_response(),
        Err(e) => handle_game_error(e),
    }
}

/// POST /api/game/guess - Judge a guess for the current clip
pub async fn guess_answer(
    State(handlers): State<GameHandlers>,
    Json(req): Json<AnswerRequest>,
) -> Response {
    match handlers
        .service
        .guess_answer(req.game_id, &req.user_answer)
        .await
    {
        Ok(answered) => answer_response(answered),
        Err(e) => handle_game_error(e),
    }
}

/// POST /api/game/answer - Judge the supplementary guess of a partial round
pub async fn complete_answer(
    State(handlers): State<GameHandlers>,
    Json(req): Json<AnswerRequest>,
) -> Response {
    match handlers
        .service
        .complete_answer(req.game_id, &req.user_answer)
        .await
    {
        Ok(answered) => answer_response(answered),
        Err(e) => handle_game_error(e),
    }
}

/// GET /api/game/:id/history - Conversation transcript of a session
pub async fn message_history(
    State(handlers): State<GameHandlers>,
    Path(game_id): Path<String>,
) -> Response {
    let game_id = match game_id.parse::<GameId>() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request("Invalid game ID")),
            )
                .into_response()
        }
    };

    match handlers.service.message_history(game_id).await {
        Ok(history) => (StatusCode::OK, Json(HistoryResponse { history })).into_response(),
        Err(e) => handle_game_error(e),
    }
}

/// DELETE /api/game/:id - Discard a session
pub async fn end_game(
    State(handlers): State<GameHandlers>,
    Path(game_id): Path<String>,
) -> Response {
    let game_id = match game_id.parse::<GameId>() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request("Invalid game ID")),
            )
                .into_response()
        }
    };

    match handlers.service.end_game(game_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => handle_game_error(e),
    }
}

fn answer_response(answered: crate::application::AnsweredGuess) -> Response {
    (
        StatusCode::OK,
        Json(AnswerResponse {
            presenter_text: answered.presenter_text,
            success: answered.success,
            points: answered.points,
            game_state: answered.state,
        }),
    )
        .into_response()
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_game_error(error: GameError) -> Response {
    match error {
        GameError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found(format!("game not found: {}", id))),
        )
            .into_response(),
        GameError::InvalidState(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(msg)),
        )
            .into_response(),
        GameError::UpstreamUnavailable(msg) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse::bad_gateway(msg)),
        )
            .into_response(),
        GameError::UpstreamParse(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal(msg)),
        )
            .into_response(),
        GameError::SelectionExhausted { attempts } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal(format!(
                "no playable track found after {} attempts",
                attempts
            ))),
        )
            .into_response(),
    }
}
