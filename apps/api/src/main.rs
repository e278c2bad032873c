mod config;
mod errors;
mod llm_client;
mod routes;
mod state;
mod store;
mod template;
mod workflow;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{LlmClient, OfflineGenerator, TextGenerator};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{MemoryTemplateStore, RedisTemplateStore, TemplateStore};
use crate::template::completeness::ScoringTable;
use crate::workflow::pipeline::Pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting proposal API v{}", env!("CARGO_PKG_VERSION"));

    // Template store: Redis when configured, process memory otherwise
    let store: Arc<dyn TemplateStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Redis template store initialized (ttl {}s)", config.session_ttl_secs);
            Arc::new(RedisTemplateStore::new(client, config.session_ttl_secs))
        }
        None => {
            warn!("REDIS_URL not set, templates are kept in memory and lost on restart");
            Arc::new(MemoryTemplateStore::default())
        }
    };

    // Text generator: Anthropic when a key is configured, offline fallback otherwise
    let llm_timeout = Duration::from_secs(config.llm_timeout_secs);
    let generator: Arc<dyn TextGenerator> = match &config.anthropic_api_key {
        Some(key) => {
            let client = LlmClient::new(key.clone(), llm_timeout)
                .context("Failed to build HTTP client for the LLM API")?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Arc::new(client)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set, every step will use the fallback generator");
            Arc::new(OfflineGenerator)
        }
    };

    // Completeness weights: built-in table unless a file is configured
    let scoring = match &config.scoring_weights_path {
        Some(path) => ScoringTable::from_json_file(path)?,
        None => ScoringTable::default(),
    };
    info!(
        "Scoring table loaded: {} fields, total weight {}",
        scoring.entries.len(),
        scoring.total_weight()
    );

    let state = AppState {
        store,
        pipeline: Pipeline::new(generator, llm_timeout),
        scoring: Arc::new(scoring),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
