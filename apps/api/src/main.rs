mod analysis;
mod coaching;
mod config;
mod errors;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::{Engine, Lexicons};
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; invalid values abort startup
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

    info!("Starting RoleFit API v{}", env!("CARGO_PKG_VERSION"));

    // Lexicons are loaded once and shared read-only by every run
    let lexicons = Arc::new(Lexicons::load(config.lexicon_path.as_deref())?);
    match &config.lexicon_path {
        Some(path) => info!("Lexicons loaded from {}", path.display()),
        None => info!("Using built-in lexicons"),
    }

    // Initialize LLM client
    let llm = LlmClient::new(&config.provider)?;
    info!("LLM client initialized (model: {})", llm.model());
    if !llm.has_credential() {
        warn!("PROVIDER_API_KEY not set; requests must supply api_key");
    }

    let engine = Engine::new(config.engine.clone(), lexicons);
    let state = AppState::new(llm, engine);

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
