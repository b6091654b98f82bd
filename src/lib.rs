pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod queries;
pub mod services;
pub mod state;

pub use config::Config;
pub use database::{DbConn, DbPool};
pub use error::{Error, Result};
pub use state::AppState;

use axum::{routing::get, Router};
use services::chat::{SessionRegistry, SessionSettings};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Load configuration from environment variables
pub fn load_config() -> std::result::Result<Config, Box<dyn std::error::Error>> {
    Ok(Config::load()?)
}

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("edgemind=info,tower_http=info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Connects the configured store and completion backend and wires them into an [`AppState`].
pub async fn build_state(config: Config) -> Result<AppState> {
    let store = services::storage::build_store(&config.storage).await?;
    let completion = services::completion::build_backend(&config.completion)?;
    let registry = SessionRegistry::new(store, completion, SessionSettings::from_config(&config));

    Ok(AppState::new(config, Arc::new(registry)))
}

/// Builds the HTTP router.
///
/// - `GET /` serves the front end, `POST /?sessionId=` runs one chat turn
/// - `GET /api/v1/health` and `GET /api/v1/history?sessionId=`
/// - everything else is a 404
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/history", get(handlers::get_history));

    Router::new()
        .route(
            "/",
            get(handlers::index)
                .post(handlers::post_chat)
                .fallback(handlers::not_found),
        )
        .nest("/api/v1", api_routes)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
