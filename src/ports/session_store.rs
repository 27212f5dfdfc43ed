//! Session Store Port - keyed registry of active game sessions.
//!
//! Replaces the original's ambient global session map with an explicit,
//! single-owner component. Sessions are handed out as per-session lock
//! handles: holding the lock for the duration of one orchestrator operation
//! serializes concurrent requests against the same game id, which is what
//! upholds the state-machine invariants.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::game::{GameId, GameSession};

/// Shared, independently lockable handle to one session.
pub type SessionHandle = Arc<Mutex<GameSession>>;

/// Process-wide registry of active game sessions.
pub trait SessionStore: Send + Sync {
    /// Registers a new session and returns its handle.
    fn create(&self, session: GameSession) -> SessionHandle;

    /// Looks up a session by id.
    fn get(&self, id: GameId) -> Option<SessionHandle>;

    /// Removes a session. Returns true if it existed.
    fn delete(&self, id: GameId) -> bool;

    /// Number of live sessions.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
