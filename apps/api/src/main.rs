mod config;
mod document;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod routes;
mod scoring;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::gemini::GeminiBackend;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Scoring API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM gateway
    let backend = GeminiBackend::new(config.gemini_api_key.clone())?;
    let llm = LlmClient::new(Arc::new(backend), config.gemini_models.clone());
    info!("LLM client initialized (models: {})", llm.models().join(", "));

    let missing = config.model_paths.missing();
    if !missing.is_empty() {
        // not fatal: scoring requests report it until the files appear
        tracing::warn!("Scoring model files not found: {}", missing.join(", "));
    }

    let state = AppState::new(config.clone(), llm);
    info!(
        "Rate limit: {} requests per {}s per client",
        config.rate_limit,
        config.rate_window.as_secs()
    );

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
