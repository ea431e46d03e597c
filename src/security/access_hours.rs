//! Time-of-day restriction for the chat API.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{Local, NaiveTime, Timelike};

use crate::config::AccessHoursConfig;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::path_matches;

/// A daily window of whole hours, `[start_hour, end_hour)` in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestrictedHours {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl RestrictedHours {
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        Self { start_hour, end_hour }
    }

    pub fn from_config(config: &AccessHoursConfig) -> Self {
        Self::new(config.start_hour, config.end_hour)
    }

    /// Whether `time` falls inside the window. A window whose start is after
    /// its end wraps past midnight; equal bounds restrict nothing.
    pub fn contains(&self, time: NaiveTime) -> bool {
        let hour = time.hour();
        if self.start_hour > self.end_hour {
            hour >= self.start_hour || hour < self.end_hour
        } else {
            hour >= self.start_hour && hour < self.end_hour
        }
    }

    pub fn denial_message(&self) -> String {
        format!(
            "Access to chat is restricted between {:02}:00 and {:02}:00.",
            self.start_hour, self.end_hour
        )
    }
}

/// Reject chat API requests during restricted hours.
pub async fn access_hours_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let config = state.config.load_full();
    let hours = &config.access_hours;

    if hours.enabled && path_matches(&hours.path_prefix, request.uri().path()) {
        let window = RestrictedHours::from_config(hours);
        if window.contains(Local::now().time()) {
            tracing::info!(path = %request.uri().path(), "Request outside allowed hours");
            metrics::record_access_denied("restricted_hours");
            return (StatusCode::FORBIDDEN, window.denial_message()).into_response();
        }
    }

    next.run(request).await
}
