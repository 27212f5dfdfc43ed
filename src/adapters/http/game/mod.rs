//! Game HTTP adapter: DTOs, handlers and routes.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::GameHandlers;
pub use routes::game_routes;
