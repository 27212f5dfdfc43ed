//! Spotify Catalog - CatalogGateway implementation over the Spotify Web API.
//!
//! Authenticates with the client-credentials flow and searches for one
//! track matching `artist:<a> track:<t>`. A track is playable only when the
//! first hit carries a preview URL. Tokens are cached until shortly before
//! expiry instead of being refetched per lookup.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::domain::game::{PlayableTrack, TrackKey};
use crate::ports::{CatalogGateway, GatewayError};

/// Safety margin subtracted from the token lifetime before refresh.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Configuration for the Spotify catalog adapter.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    client_secret: Secret<String>,
    /// Token endpoint.
    pub auth_url: String,
    /// API root for searches.
    pub api_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl SpotifyConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: Secret::new(client_secret.into()),
            auth_url: "https://accounts.spotify.com/api/token".to_string(),
            api_url: "https://api.spotify.com/v1".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn client_secret(&self) -> &str {
        self.client_secret.expose_secret()
    }
}

#[derive(Debug)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Spotify Web API catalog gateway.
pub struct SpotifyCatalog {
    config: SpotifyConfig,
    client: Client,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyCatalog {
    pub fn new(config: SpotifyConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            token: Mutex::new(None),
        })
    }

    /// Returns a valid access token, refreshing through the
    /// client-credentials flow when the cached one is missing or stale.
    async fn access_token(&self) -> Result<String, GatewayError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.access_token.clone());
            }
        }

        let response = self
            .client
            .post(&self.config.auth_url)
            .basic_auth(&self.config.client_id, Some(self.config.client_secret()))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED
            || response.status() == reqwest::StatusCode::BAD_REQUEST
        {
            return Err(GatewayError::AuthenticationFailed);
        }
        if !response.status().is_success() {
            return Err(GatewayError::unavailable(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::invalid_response(format!("bad token body: {e}")))?;

        let lifetime = Duration::from_secs(body.expires_in)
            .saturating_sub(TOKEN_EXPIRY_MARGIN);
        let token = body.access_token.clone();
        *cached = Some(CachedToken {
            access_token: body.access_token,
            expires_at: Instant::now() + lifetime,
        });

        Ok(token)
    }

    fn transport_error(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout {
                timeout_secs: self.config.timeout.as_secs(),
            }
        } else {
            GatewayError::network(e.to_string())
        }
    }
}

#[async_trait]
impl CatalogGateway for SpotifyCatalog {
    async fn lookup(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Option<PlayableTrack>, GatewayError> {
        let token = self.access_token().await?;

        let response = self
            .client
            .get(format!("{}/search", self.config.api_url))
            .bearer_auth(token)
            .query(&[
                ("q", format!("artist:{artist} track:{title}")),
                ("type", "track".to_string()),
                ("limit", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            // Token revoked out from under us; drop the cache so the next
            // lookup re-authenticates.
            *self.token.lock().await = None;
            return Err(GatewayError::AuthenticationFailed);
        }
        if !response.status().is_success() {
            return Err(GatewayError::unavailable(format!(
                "search returned {}",
                response.status()
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::invalid_response(format!("bad search body: {e}")))?;

        let Some(item) = body.tracks.items.into_iter().next() else {
            tracing::debug!(artist, title, "no catalog hits");
            return Ok(None);
        };

        match item.preview_url {
            Some(preview_url) if !preview_url.is_empty() => Ok(Some(PlayableTrack {
                key: TrackKey::new(artist, title),
                preview_url,
            })),
            _ => {
                tracing::debug!(artist, title, "catalog hit without preview");
                Ok(None)
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════
// Wire types
// ════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: TrackPage,
}

#[derive(Debug, Deserialize, Default)]
struct TrackPage {
    #[serde(default)]
    items: Vec<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    #[serde(default)]
    preview_url: Option<String>,
}
