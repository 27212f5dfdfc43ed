//! Ports layer - trait interfaces decoupling the orchestrator from
//! external collaborators and infrastructure.

mod catalog;
mod conversation;
mod session_store;

pub use catalog::CatalogGateway;
pub use conversation::{ChatMessage, ConversationGateway, GatewayError};
pub use session_store::{SessionHandle, SessionStore};
