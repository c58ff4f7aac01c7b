mod advisor;
mod config;
mod errors;
mod extract;
mod llm_client;
mod models;
mod routes;
mod session;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::advisor::requester::RecommendationRequester;
use crate::config::Config;
use crate::routes::build_router;
use crate::session::store::{spawn_idle_sweeper, InMemorySessionStore, SessionStore};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pathway API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize advisor (Gemini-backed when a key is present)
    let advisor =
        RecommendationRequester::from_config(&config).context("Failed to build LLM client")?;
    if advisor.is_configured() {
        info!(
            "Advisor initialized (model: {}, fallback: {})",
            advisor.primary_model(),
            config.gemini_fallback_model
        );
    } else {
        warn!("GEMINI_API_KEY is not set; recommendations will return the not-configured result");
    }

    // Session store with idle eviction
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    spawn_idle_sweeper(
        sessions.clone(),
        config.session_idle_ttl,
        config.session_sweep_interval,
    );
    info!(
        "Session sweeper started (idle ttl: {:?}, every {:?})",
        config.session_idle_ttl, config.session_sweep_interval
    );

    // Build app state
    let state = AppState {
        advisor,
        sessions,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
