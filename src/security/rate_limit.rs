//! Per-client sliding-window rate limiting for message writes.
//!
//! Each client key maps to the timestamps of its recently admitted requests.
//! A check prunes timestamps that have aged out of the window, then admits
//! only if fewer than `limit` remain. Prune, check and append happen under a
//! single mutex so concurrent requests from one client cannot over-admit.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::config::RateLimitConfig;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::client_ip::{peer_addr, resolve_client_ip, UNKNOWN_CLIENT};
use crate::security::path_matches;

/// Mutable limiter state guarded by the limiter's mutex.
struct RateState {
    limit: usize,
    window: Duration,
    clients: HashMap<String, VecDeque<Instant>>,
}

impl RateState {
    fn prune(&mut self, key: &str, now: Instant) -> Option<&mut VecDeque<Instant>> {
        let window = self.window;
        let timestamps = self.clients.get_mut(key)?;
        while let Some(&oldest) = timestamps.front() {
            if now.saturating_duration_since(oldest) >= window {
                timestamps.pop_front();
            } else {
                break;
            }
        }
        Some(timestamps)
    }
}

/// Recent request count for one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientUsage {
    pub client: String,
    pub recent_requests: usize,
}

/// Outcome of [`SlidingWindowLimiter::decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub admitted: bool,
    pub limit: u32,
    pub window: Duration,
    /// Set on rejection when a slot will free up within the window.
    pub retry_after: Option<Duration>,
    pub tracked_clients: usize,
}

/// Lock-protected registry of per-client request timestamps.
pub struct SlidingWindowLimiter {
    state: Mutex<RateState>,
}

impl SlidingWindowLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            state: Mutex::new(RateState {
                limit: limit as usize,
                window,
                clients: HashMap::new(),
            }),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, config.window())
    }

    // Every critical section leaves the map consistent, so a panic elsewhere
    // never invalidates it.
    fn lock(&self) -> MutexGuard<'_, RateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admit or reject a request from `ip` observed at `now`.
    ///
    /// Expired timestamps are dropped first. If the client already has `limit`
    /// requests in the window the call is rejected and `now` is not recorded.
    pub fn admit(&self, ip: &str, now: Instant) -> bool {
        self.decide(ip, now).admitted
    }

    /// [`admit`](Self::admit), also reporting the limits that decided the
    /// outcome. Everything in the result is read in the same critical section.
    pub fn decide(&self, ip: &str, now: Instant) -> Decision {
        let key = normalize_key(ip);
        let mut state = self.lock();
        let limit = state.limit;
        let window = state.window;
        let mut decision = Decision {
            admitted: false,
            limit: u32::try_from(limit).unwrap_or(u32::MAX),
            window,
            retry_after: None,
            tracked_clients: 0,
        };

        let existing = state.prune(key, now).map(|timestamps| {
            if timestamps.len() < limit {
                timestamps.push_back(now);
                return (true, None);
            }
            // Every remaining entry is in the window; the one `limit` places
            // from the newest has to expire before a slot frees up.
            let retry = timestamps
                .len()
                .checked_sub(limit)
                .and_then(|i| timestamps.get(i))
                .map(|&t| window.saturating_sub(now.saturating_duration_since(t)));
            (false, retry)
        });

        match existing {
            Some((admitted, retry_after)) => {
                decision.admitted = admitted;
                decision.retry_after = retry_after;
            }
            None if limit > 0 => {
                state.clients.insert(key.to_string(), VecDeque::from([now]));
                decision.admitted = true;
            }
            None => {}
        }

        decision.tracked_clients = state.clients.len();
        decision
    }

    /// [`admit`](Self::admit) at the current instant.
    pub fn check(&self, ip: &str) -> bool {
        self.admit(ip, Instant::now())
    }

    /// Replace the threshold and window. Recorded timestamps are kept and
    /// judged against the new window on the next check.
    pub fn set_limits(&self, limit: u32, window: Duration) {
        let mut state = self.lock();
        state.limit = limit as usize;
        state.window = window;
    }

    pub fn limits(&self) -> (u32, Duration) {
        let state = self.lock();
        (u32::try_from(state.limit).unwrap_or(u32::MAX), state.window)
    }

    /// Time until `ip` would be admitted again, or `None` if it would be
    /// admitted now. Does not modify state.
    pub fn retry_after(&self, ip: &str, now: Instant) -> Option<Duration> {
        let key = normalize_key(ip);
        let state = self.lock();
        let timestamps = state.clients.get(key)?;

        let live: Vec<Instant> = timestamps
            .iter()
            .copied()
            .filter(|&t| now.saturating_duration_since(t) < state.window)
            .collect();
        if live.len() < state.limit {
            return None;
        }

        // The client becomes admissible once enough of the oldest entries expire
        // to bring it below the limit.
        let release = live.get(live.len() - state.limit)?;
        Some(state.window.saturating_sub(now.saturating_duration_since(*release)))
    }

    /// In-window request counts for every tracked client, sorted by key.
    pub fn snapshot(&self, now: Instant) -> Vec<ClientUsage> {
        let state = self.lock();
        let mut usage: Vec<ClientUsage> = state
            .clients
            .iter()
            .map(|(client, timestamps)| ClientUsage {
                client: client.clone(),
                recent_requests: timestamps
                    .iter()
                    .filter(|&&t| now.saturating_duration_since(t) < state.window)
                    .count(),
            })
            .collect();
        usage.sort_by(|a, b| a.client.cmp(&b.client));
        usage
    }

    pub fn tracked_clients(&self) -> usize {
        self.lock().clients.len()
    }
}

fn normalize_key(ip: &str) -> &str {
    let trimmed = ip.trim();
    if trimmed.is_empty() {
        UNKNOWN_CLIENT
    } else {
        trimmed
    }
}

/// Human form of a window length: "1 minute", "5 minutes", "30 seconds".
pub fn describe_window(window: Duration) -> String {
    let secs = window.as_secs();
    match secs {
        60 => "1 minute".to_string(),
        s if s > 0 && s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "1 second".to_string(),
        s => format!("{} seconds", s),
    }
}

/// Middleware enforcing the per-IP message rate limit.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let config = state.config.load_full();
    let rl = &config.rate_limit;

    let method_matches = rl
        .methods
        .iter()
        .any(|m| m.trim().eq_ignore_ascii_case(request.method().as_str()));
    if !rl.enabled || !method_matches || !path_matches(&rl.path_prefix, request.uri().path()) {
        return next.run(request).await;
    }

    let ip = resolve_client_ip(request.headers(), peer_addr(&request), rl.trust_forwarded_for);
    let decision = state.limiter.decide(&ip, Instant::now());

    if decision.admitted {
        metrics::record_tracked_clients(decision.tracked_clients);
        return next.run(request).await;
    }

    tracing::warn!(
        client = %ip,
        limit = decision.limit,
        window_secs = decision.window.as_secs(),
        "Rate limit exceeded"
    );
    metrics::record_rate_limited("message_window");

    let body = format!(
        "Rate limit exceeded: You can send only {} messages per {}.",
        decision.limit,
        describe_window(decision.window)
    );
    let mut response = (StatusCode::FORBIDDEN, body).into_response();
    if let Some(wait) = decision.retry_after {
        let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(secs.max(1)));
    }
    response
}
