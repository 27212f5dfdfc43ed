//! Binary entrypoint: configuration, wiring and the HTTP server.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use blindtest::adapters::ai::{OpenAiConfig, OpenAiGateway};
use blindtest::adapters::catalog::{SpotifyCatalog, SpotifyConfig};
use blindtest::adapters::http::{game_routes, GameHandlers};
use blindtest::adapters::store::InMemorySessionStore;
use blindtest::application::GameService;
use blindtest::config::AppConfig;
use blindtest::domain::game::UnavailableTracks;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    config.validate()?;

    let oracle_config = OpenAiConfig::new(config.ai.openai_api_key.clone())
        .with_model(config.ai.model.clone())
        .with_base_url(config.ai.base_url.clone())
        .with_timeout(config.ai.timeout())
        .with_max_retries(config.ai.max_retries);
    let oracle = Arc::new(OpenAiGateway::new(oracle_config)?);

    let catalog_config = SpotifyConfig::new(
        config.catalog.spotify_client_id.clone(),
        config.catalog.spotify_client_secret.clone(),
    )
    .with_auth_url(config.catalog.auth_url.clone())
    .with_api_url(config.catalog.api_url.clone())
    .with_timeout(config.catalog.timeout());
    let catalog = Arc::new(SpotifyCatalog::new(catalog_config)?);

    let service = Arc::new(GameService::new(
        Arc::new(InMemorySessionStore::new()),
        oracle,
        catalog,
        UnavailableTracks::new(),
        config.game.gameplay_options(),
    ));

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api/game", game_routes(GameHandlers::new(service)))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors_layer(&config));

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, "blindtest server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
