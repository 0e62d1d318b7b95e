mod agent;
mod config;
mod conversation;
mod errors;
mod extract;
mod models;
mod routes;
mod service;
mod session;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, error, info};

use crate::agent::GroqAgentService;
use crate::config::AppConfig;
use crate::service::chat_service::{ChatService, ChatSettings};
use crate::session::SessionStore;

const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    // Initialise tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docchat=debug,tower_http=debug".into()),
        )
        .init();

    // ── Configuration ─────────────────────────────────────────────────────────
    let config = AppConfig::from_env().inspect_err(|e| error!("Refusing to start: {e}"))?;

    // ── Dependency wiring ─────────────────────────────────────────────────────
    let agent = GroqAgentService::new(&config.api_key, &config.base_url)
        .context("Failed to build completion client")?;
    let sessions = SessionStore::new();
    let settings = ChatSettings {
        max_history: config.max_history,
        document_char_limit: config.document_char_limit,
        ..ChatSettings::default()
    };
    let chat_service = ChatService::new(sessions.clone(), Arc::new(agent), settings);

    // ── Idle session eviction (opt-in) ────────────────────────────────────────
    match config.session_idle {
        Some(max_idle) => {
            info!("Evicting sessions idle for {}s", max_idle.as_secs());
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(EVICTION_INTERVAL);
                loop {
                    ticker.tick().await;
                    sessions.evict_idle(max_idle).await;
                }
            });
        }
        None => debug!("Idle eviction disabled; sessions live until restart"),
    }

    // ── Router ────────────────────────────────────────────────────────────────
    let app = routes::router(chat_service, &config.static_dir, config.max_upload_bytes);

    // ── Listen ────────────────────────────────────────────────────────────────
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(
        "Listening on http://{addr}/ (model {}, serving {})",
        agent::MODEL,
        config.static_dir.display()
    );

    axum::serve(listener, app).await?;
    Ok(())
}
