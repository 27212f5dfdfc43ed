//! HTTP adapters - REST API implementations.

pub mod game;

pub use game::{game_routes, GameHandlers};
