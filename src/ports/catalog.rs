//! Catalog Gateway Port - Interface to the external music catalog.

use async_trait::async_trait;

use crate::domain::game::PlayableTrack;

use super::GatewayError;

/// Port for confirming that a proposed song is actually playable.
///
/// `Ok(None)` is a definitive "not currently playable", not an error; the
/// selector records such tracks and moves on. Errors mean the lookup itself
/// failed and the track's status is unknown.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    async fn lookup(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Option<PlayableTrack>, GatewayError>;
}
