use std::time::Instant;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;
use crate::security::rate_limit::ClientUsage;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub uptime_secs: u64,
    pub messages: usize,
    pub tracked_clients: usize,
}

#[derive(Serialize)]
pub struct RateLimitReport {
    pub enabled: bool,
    pub limit: u32,
    pub window_secs: u64,
    pub clients: Vec<ClientUsage>,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        uptime_secs: state.started_at.elapsed().as_secs(),
        messages: state.messages.len(),
        tracked_clients: state.limiter.tracked_clients(),
    })
}

pub async fn get_rate_limits(State(state): State<AppState>) -> Json<RateLimitReport> {
    let (limit, window) = state.limiter.limits();
    Json(RateLimitReport {
        enabled: state.config.load().rate_limit.enabled,
        limit,
        window_secs: window.as_secs(),
        clients: state.limiter.snapshot(Instant::now()),
    })
}
