//! In-memory session store.
//!
//! Sessions live for the duration of the process; there is no persistence
//! across restarts. The outer map lock is held only for registry
//! bookkeeping, never across an orchestrator operation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;

use crate::domain::game::{GameId, GameSession};
use crate::ports::{SessionHandle, SessionStore};

/// Process-wide in-memory session registry.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: StdMutex<HashMap<GameId, SessionHandle>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self, session: GameSession) -> SessionHandle {
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        self.sessions
            .lock()
            .expect("session map poisoned")
            .insert(id, handle.clone());
        handle
    }

    fn get(&self, id: GameId) -> Option<SessionHandle> {
        self.sessions
            .lock()
            .expect("session map poisoned")
            .get(&id)
            .cloned()
    }

    fn delete(&self, id: GameId) -> bool {
        self.sessions
            .lock()
            .expect("session map poisoned")
            .remove(&id)
            .is_some()
    }

    fn len(&self) -> usize {
        self.sessions.lock().expect("session map poisoned").len()
    }
}
