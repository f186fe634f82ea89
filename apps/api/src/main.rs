mod ai;
mod calendar;
mod clients;
mod config;
mod dashboard;
mod deals;
mod errors;
mod extract;
mod insights;
mod listing;
mod llm_client;
mod models;
mod notifications;
mod response;
mod routes;
mod search;
mod state;
mod store;
mod uploads;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{ChatModel, LlmClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=info",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Dealroom API v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::new(&config)?;
    if llm.is_configured() {
        info!("LLM client initialized (model: {})", config.openai_model);
    } else {
        warn!("OPENAI_API_KEY not set; AI endpoints will serve demo content");
    }

    let state = AppState::new(config.clone(), Arc::new(llm));
    info!(
        "Store seeded with {} deals, {} clients",
        state.store.deals.read().len(),
        state.store.clients.read().len()
    );

    let app = build_router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
