//! Music catalog (Spotify) configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Spotify catalog configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Spotify application client id
    #[serde(default)]
    pub spotify_client_id: String,

    /// Spotify application client secret
    #[serde(default)]
    pub spotify_client_secret: String,

    /// Token endpoint (overridable for testing)
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// API root for searches (overridable for testing)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl CatalogConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate catalog configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.spotify_client_id.is_empty() {
            return Err(ValidationError::MissingRequired("catalog.spotify_client_id"));
        }
        if self.spotify_client_secret.is_empty() {
            return Err(ValidationError::MissingRequired(
                "catalog.spotify_client_secret",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            spotify_client_id: String::new(),
            spotify_client_secret: String::new(),
            auth_url: default_auth_url(),
            api_url: default_api_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_auth_url() -> String {
    "https://accounts.spotify.com/api/token".to_string()
}

fn default_api_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_timeout() -> u64 {
    10
}
