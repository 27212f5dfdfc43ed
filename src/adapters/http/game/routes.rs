//! HTTP routes for the game endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers::{
    choose_theme, complete_answer, end_game, guess_answer, message_history, start_game,
    start_song, GameHandlers,
};

/// Creates the game router with all endpoints.
pub fn game_routes(handlers: GameHandlers) -> Router {
    Router::new()
        .route("/start", post(start_game))
        .route("/theme", post(choose_theme))
        .route("/song", post(start_song))
        .route("/guess", post(guess_answer))
        .route("/answer", post(complete_answer))
        .route("/:id/history", get(message_history))
        .route("/:id", delete(end_game))
        .with_state(handlers)
}
