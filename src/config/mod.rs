//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `BLINDTEST` prefix and nested values use `__` as separator.
//!
//! # Example
//!
//! ```no_run
//! use blindtest::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod catalog;
mod error;
mod game;
mod server;

pub use ai::AiConfig;
pub use catalog::CatalogConfig;
pub use error::{ConfigError, ValidationError};
pub use game::GameConfig;
pub use server::ServerConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, timeouts, CORS)
    #[serde(default)]
    pub server: ServerConfig,

    /// AI oracle configuration (OpenAI)
    #[serde(default)]
    pub ai: AiConfig,

    /// Music catalog configuration (Spotify)
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Gameplay tuning
    #[serde(default)]
    pub game: GameConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads a `.env` file if present, then reads environment variables
    /// with the `BLINDTEST` prefix; `__` separates nested values:
    ///
    /// - `BLINDTEST__SERVER__PORT=3000` -> `server.port = 3000`
    /// - `BLINDTEST__AI__OPENAI_API_KEY=...` -> `ai.openai_api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the expected
    /// types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("BLINDTEST")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.catalog.validate()?;
        self.game.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global; serialize these tests.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var("BLINDTEST__AI__OPENAI_API_KEY", "sk-test");
        env::set_var("BLINDTEST__CATALOG__SPOTIFY_CLIENT_ID", "client-id");
        env::set_var("BLINDTEST__CATALOG__SPOTIFY_CLIENT_SECRET", "client-secret");
    }

    fn clear_env() {
        env::remove_var("BLINDTEST__AI__OPENAI_API_KEY");
        env::remove_var("BLINDTEST__CATALOG__SPOTIFY_CLIENT_ID");
        env::remove_var("BLINDTEST__CATALOG__SPOTIFY_CLIENT_SECRET");
        env::remove_var("BLINDTEST__SERVER__PORT");
        env::remove_var("BLINDTEST__GAME__MAX_SONGS");
    }

    #[test]
    fn load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.ai.openai_api_key, "sk-test");
        assert_eq!(config.catalog.spotify_client_id, "client-id");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn server_defaults_apply() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.game.max_songs, 5);
    }

    #[test]
    fn nested_overrides_apply() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("BLINDTEST__SERVER__PORT", "8080");
        env::set_var("BLINDTEST__GAME__MAX_SONGS", "3");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.game.max_songs, 3);
    }

    #[test]
    fn missing_credentials_fail_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_err());
    }
}
