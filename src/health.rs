//! Liveness endpoint for the container orchestrator.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc
};

/// Shared health metrics, read and bumped by the probe handler
#[derive(Default)]
pub struct HealthState {
    checks_run: AtomicU64
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_check(&self) -> u64 {
        self.checks_run.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn checks_run(&self) -> u64 {
        self.checks_run.load(Ordering::Relaxed)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    checks_run: u64
}

pub fn router(state: Arc<HealthState>) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

async fn health(State(state): State<Arc<HealthState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        checks_run: state.record_check()
    })
}

/// Binds the health server and serves probes until the process exits
pub async fn serve(port: u16, state: Arc<HealthState>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    log::info!("health check listening on port {port}");
    axum::serve(listener, router(state)).await
}
