//! Health check endpoint
//!
//! `/health` reports readiness together with what the bot serves: the
//! registered command names and the mapping catalog it answers from. It
//! answers 503 until the gateway session is ready. `/live` only confirms the
//! process is up.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use mappings_command::MappingDownloader;
use serde::{Deserialize, Serialize};
use serenity::prelude::TypeMapKey;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::RwLock;

/// The mapping catalog as loaded at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogSummary {
    pub latest_version: String,
    pub versions: usize,
}

impl CatalogSummary {
    pub fn of<D: MappingDownloader + ?Sized>(downloader: &D) -> Self {
        Self {
            latest_version: downloader.latest_version(),
            versions: downloader.known_versions().len(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `ok` once connected to Discord, `starting` before.
    pub status: String,
    pub bot_username: Option<String>,
    pub uptime_secs: u64,
    pub commands: Vec<String>,
    pub catalog: CatalogSummary,
}

/// Shared application state for health checks
#[derive(Clone)]
pub struct AppState {
    start_time: SystemTime,
    bot_username: Arc<RwLock<Option<String>>>,
    commands: Arc<[String]>,
    catalog: CatalogSummary,
}

impl AppState {
    pub fn new(commands: Vec<String>, catalog: CatalogSummary) -> Self {
        Self {
            start_time: SystemTime::now(),
            bot_username: Arc::new(RwLock::new(None)),
            commands: commands.into(),
            catalog,
        }
    }

    /// Mark the gateway session ready.
    pub async fn set_bot_username(&self, username: String) {
        *self.bot_username.write().await = Some(username);
    }

    async fn status(&self) -> (StatusCode, HealthStatus) {
        let bot_username = self.bot_username.read().await.clone();
        let (code, status) = match bot_username {
            Some(_) => (StatusCode::OK, "ok"),
            None => (StatusCode::SERVICE_UNAVAILABLE, "starting"),
        };
        let body = HealthStatus {
            status: status.to_string(),
            bot_username,
            uptime_secs: self.start_time.elapsed().unwrap_or_default().as_secs(),
            commands: self.commands.to_vec(),
            catalog: self.catalog.clone(),
        };
        (code, body)
    }
}

impl TypeMapKey for AppState {
    type Value = AppState;
}

async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let (code, body) = state.status().await;
    (code, Json(body))
}

async fn live_handler() -> StatusCode {
    StatusCode::OK
}

/// Create the health check router
pub fn create_health_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/live", get(live_handler))
        .with_state(state)
}

/// Start the health check server
pub async fn start_health_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_health_router(state);
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Health check server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
