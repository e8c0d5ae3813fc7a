//! Threat Intelligence Server
//!
//! Pulls threat pulses from AlienVault OTX into PostgreSQL, serves tag search
//! over the stored records and answers questions grounded on them through a
//! hosted text generation API.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   THREAT INTEL SERVER                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌─────────────┐   ┌──────────────────────┐ │
//! │  │  Ingest   │   │   Search    │   │  Ask                  │ │
//! │  │  (OTX)    │   │  (tags)     │   │  match → context →    │ │
//! │  │           │   │             │   │  generation API       │ │
//! │  └─────┬─────┘   └──────┬──────┘   └──────────┬───────────┘ │
//! │        └────────────────┼─────────────────────┘             │
//! │                         ▼                                   │
//! │                  ┌─────────────┐                            │
//! │                  │ PostgreSQL  │                            │
//! │                  └─────────────┘                            │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod clients;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::clients::{FeedClient, GenerationClient};
use crate::db::{PgThreatStore, ThreatStore};
use crate::services::{AnswerService, QueryMatcher};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env first so RUST_LOG and LOG_FORMAT can live there
    dotenvy::dotenv().ok();

    // Initialize logging
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "threat_intel_server=debug,tower_http=debug".into()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .init();

    // Load configuration
    let config = config::Config::from_env();

    tracing::info!("Threat Intel Server starting...");

    let database_url = config.database_url.clone()
        .context("DATABASE_URL is not set")?;
    tracing::info!("Database: {}", config.redacted_database_url());

    if config.otx_api_key.is_none() {
        tracing::warn!("OTX_API_KEY is not set, ingestion requests will be rejected");
    }
    if config.generation_api_key.is_none() {
        tracing::warn!("GENERATION_API_KEY is not set, ask requests will be rejected");
    }

    // Initialize database pool
    let pg = PgThreatStore::connect(&database_url, config.database_max_connections).await
        .context("Failed to create database pool")?;

    tracing::info!("Running database migrations...");
    pg.run_migrations().await
        .context("Failed to run migrations")?;

    let store: Arc<dyn ThreatStore> = Arc::new(pg);

    // Build application state
    let state = AppState::new(&config, store.clone())?;

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ThreatStore>,
    pub feed: FeedClient,
    pub matcher: QueryMatcher,
    pub answers: AnswerService,
}

impl AppState {
    pub fn new(config: &config::Config, store: Arc<dyn ThreatStore>) -> reqwest::Result<Self> {
        let http_client = clients::build_http_client(config.upstream_timeout_secs)?;

        let feed = FeedClient::new(
            config.otx_base_url.clone(),
            config.otx_api_key.clone(),
            http_client.clone(),
        );
        let generator = GenerationClient::new(
            config.generation_api_url.clone(),
            config.generation_api_key.clone(),
            http_client,
        );
        let matcher = QueryMatcher::new(store.clone(), config.match_limit);
        let answers = AnswerService::new(matcher.clone(), generator);

        Ok(Self {
            store,
            feed,
            matcher,
            answers,
        })
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/ingest", get(handlers::ingest::pull))
        .route("/api/v1/search", get(handlers::search::search))
        .route("/api/v1/ask", post(handlers::ask::ask))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
