//! # Siteforge Node
//!
//! Service binary running the build-and-billing workflow behind an HTTP API.

use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod api;
mod auth;
mod config;
mod orchestrator;
mod state;

use config::NodeConfig;
use state::AppState;

/// Run the Siteforge node server.
pub async fn run_server(config: NodeConfig) -> anyhow::Result<()> {
    // Initialize tracing; RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("🚀 Siteforge node starting...");

    let state = AppState::from_config(&config)?;
    let app = create_router(state);

    info!("🌐 Listening on http://{}", config.bind);

    let listener = TcpListener::bind(config.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the API router.
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::health::health_check))
        .route("/api/v1/build", post(api::build::submit_build))
        .route(
            "/api/v1/projects/:project_id/versions",
            get(api::history::list_versions),
        )
        .route(
            "/api/v1/projects/:project_id/failures",
            get(api::history::list_failures),
        )
        .route(
            "/api/v1/projects/:project_id/charges",
            get(api::history::list_charges),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = NodeConfig::parse();
    run_server(config).await
}
