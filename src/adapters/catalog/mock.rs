//! Mock catalog gateway for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::game::{PlayableTrack, TrackKey};
use crate::ports::{CatalogGateway, GatewayError};

/// One scripted lookup outcome.
#[derive(Debug, Clone)]
enum MockLookup {
    Playable(String),
    Unplayable,
    Error(GatewayError),
}

/// Scripted catalog for tests. Outcomes are consumed in call order; clones
/// share the same script and call log.
#[derive(Debug, Clone, Default)]
pub struct MockCatalog {
    lookups: Arc<Mutex<VecDeque<MockLookup>>>,
    calls: Arc<Mutex<Vec<TrackKey>>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a playable result with the given preview URL.
    pub fn with_playable(self, preview_url: impl Into<String>) -> Self {
        self.lookups
            .lock()
            .unwrap()
            .push_back(MockLookup::Playable(preview_url.into()));
        self
    }

    /// Queues a definitive "not playable" result.
    pub fn with_unplayable(self) -> Self {
        self.lookups.lock().unwrap().push_back(MockLookup::Unplayable);
        self
    }

    /// Queues a lookup failure.
    pub fn with_error(self, error: GatewayError) -> Self {
        self.lookups.lock().unwrap().push_back(MockLookup::Error(error));
        self
    }

    /// The `{artist, title}` pairs looked up, in call order.
    pub fn calls(&self) -> Vec<TrackKey> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogGateway for MockCatalog {
    async fn lookup(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Option<PlayableTrack>, GatewayError> {
        self.calls.lock().unwrap().push(TrackKey::new(artist, title));

        let lookup = self.lookups.lock().unwrap().pop_front();
        match lookup {
            Some(MockLookup::Playable(preview_url)) => Ok(Some(PlayableTrack {
                key: TrackKey::new(artist, title),
                preview_url,
            })),
            Some(MockLookup::Unplayable) | None => Ok(None),
            Some(MockLookup::Error(err)) => Err(err),
        }
    }
}
