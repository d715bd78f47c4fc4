mod chat;
mod config;
mod db;
mod errors;
mod llm_client;
mod logs;
mod models;
mod plan;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{CompletionProvider, LlmClient};
use crate::logs::InteractionLog;
use crate::plan::fetcher::{ContentFetcher, HttpScraper};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let target = env!("CARGO_PKG_NAME").replace('-', "_");
            EnvFilter::new(format!("{target}={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting portfolio API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the audit store. Its unavailability degrades logging only;
    // the plan and chat endpoints stay up.
    let interaction_log = match &config.database_url {
        Some(url) => match create_pool(url).await {
            Ok(pool) => InteractionLog::new(pool),
            Err(e) => {
                error!("Failed to connect to PostgreSQL, interaction logging disabled: {e}");
                InteractionLog::disabled()
            }
        },
        None => {
            warn!("DATABASE_URL is not set; interaction logging disabled");
            InteractionLog::disabled()
        }
    };

    // Initialize LLM client
    let llm: Arc<dyn CompletionProvider> =
        Arc::new(LlmClient::new(config.anthropic_api_key.clone()));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize the content fetcher with the HTTP scraping collaborator
    let fetcher = ContentFetcher::new(Arc::new(HttpScraper::new()));

    if config.admin_log_key.is_none() {
        warn!("ADMIN_LOG_KEY is not set; /admin-logs will return a configuration error");
    }

    // Build app state
    let state = AppState {
        llm,
        fetcher,
        logs: interaction_log,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // the frontend is served from another origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
