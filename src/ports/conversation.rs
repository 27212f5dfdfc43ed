//! Conversation Gateway Port - Interface to the AI oracle.
//!
//! The oracle acts as presenter and judge: it receives the running
//! role-tagged transcript and answers with free text that is expected to
//! contain one JSON object per the active prompt's schema. Parsing that
//! text is the domain's job; this port only moves messages.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::game::{GameError, Role, TranscriptMessage};

/// A single role-tagged turn sent to the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

impl From<&TranscriptMessage> for ChatMessage {
    fn from(message: &TranscriptMessage) -> Self {
        Self::new(message.role, message.content.clone())
    }
}

/// Port for sending a transcript to the oracle and receiving its reply.
#[async_trait]
pub trait ConversationGateway: Send + Sync {
    /// Sends the ordered transcript and returns the oracle's reply text.
    async fn send(&self, transcript: &[ChatMessage]) -> Result<String, GatewayError>;
}

/// Failures talking to an external gateway (oracle or catalog).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The call did not complete within the configured deadline.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The remote service failed or refused the request.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Credentials were rejected.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// The remote answered with a body we could not understand.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        GatewayError::Unavailable(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        GatewayError::Network(message.into())
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        GatewayError::InvalidResponse(message.into())
    }

    /// True for failures worth retrying: the outcome is unknown or the
    /// service may recover, as opposed to a definitive rejection.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayError::Timeout { .. }
                | GatewayError::Unavailable(_)
                | GatewayError::Network(_)
        )
    }
}

impl From<GatewayError> for GameError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::InvalidResponse(msg) => GameError::UpstreamParse(msg),
            other => GameError::UpstreamUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(GatewayError::Timeout { timeout_secs: 30 }.is_transient());
        assert!(GatewayError::unavailable("down").is_transient());
        assert!(GatewayError::network("reset").is_transient());
        assert!(!GatewayError::AuthenticationFailed.is_transient());
        assert!(!GatewayError::invalid_response("garbage").is_transient());
    }

    #[test]
    fn gateway_errors_map_onto_game_errors() {
        let parse: GameError = GatewayError::invalid_response("bad body").into();
        assert!(matches!(parse, GameError::UpstreamParse(_)));

        let unavailable: GameError = GatewayError::Timeout { timeout_secs: 5 }.into();
        assert!(matches!(unavailable, GameError::UpstreamUnavailable(_)));
    }

    #[test]
    fn chat_message_from_transcript_turn() {
        let turn = TranscriptMessage::user("hello");
        let msg = ChatMessage::from(&turn);
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "hello");
    }
}
