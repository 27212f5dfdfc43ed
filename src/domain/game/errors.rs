//! Game-specific error types.

use super::GameId;
use thiserror::Error;

/// Errors raised by game session operations.
///
/// `NotFound` and `InvalidState` are client errors (4xx at the HTTP edge);
/// the upstream variants surface gateway failures (5xx). None are silently
/// swallowed, and only the song selector's bounded playability loop retries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    /// No session exists for the given id.
    #[error("game not found: {0}")]
    NotFound(GameId),

    /// The action is not valid in the session's current step.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The oracle reply was not valid JSON for the expected schema,
    /// even after sanitization.
    #[error("failed to parse oracle reply: {0}")]
    UpstreamParse(String),

    /// A gateway call failed or timed out.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The song selector ran out of attempts without finding a playable
    /// track for the theme.
    #[error("no playable track found after {attempts} attempts")]
    SelectionExhausted { attempts: u32 },
}

impl GameError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        GameError::InvalidState(message.into())
    }

    pub fn upstream_parse(message: impl Into<String>) -> Self {
        GameError::UpstreamParse(message.into())
    }

    pub fn upstream_unavailable(message: impl Into<String>) -> Self {
        GameError::UpstreamUnavailable(message.into())
    }

    /// True if the failure originated in an external collaborator.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            GameError::UpstreamParse(_)
                | GameError::UpstreamUnavailable(_)
                | GameError::SelectionExhausted { .. }
        )
    }
}
