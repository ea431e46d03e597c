//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the chat gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request hardening.
    pub security: SecurityConfig,

    /// Per-IP message rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Time-of-day restriction for the chat API.
    pub access_hours: AccessHoursConfig,

    /// Paths reserved for staff roles.
    pub roles: RolesConfig,

    /// Message log limits and pagination.
    pub messages: MessagesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Add `X-Content-Type-Options` and `X-Frame-Options` to responses.
    pub enable_headers: bool,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 64 * 1024,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Maximum admitted requests per client within one window.
    pub max_requests: u32,

    /// Length of the trailing window in seconds.
    pub window_secs: u64,

    /// HTTP methods subject to the limit.
    pub methods: Vec<String>,

    /// Path prefix subject to the limit.
    pub path_prefix: String,

    /// Use the first `X-Forwarded-For` entry as the client key.
    pub trust_forwarded_for: bool,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 5,
            window_secs: 60,
            methods: vec!["POST".to_string()],
            path_prefix: "/api/messages/".to_string(),
            trust_forwarded_for: true,
        }
    }
}

/// Restricted hours for the chat API, in local time.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessHoursConfig {
    pub enabled: bool,

    /// First restricted hour (0-23).
    pub start_hour: u32,

    /// First hour after the restriction ends (0-23).
    pub end_hour: u32,

    pub path_prefix: String,
}

impl Default for AccessHoursConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            start_hour: 21,
            end_hour: 6,
            path_prefix: "/api/".to_string(),
        }
    }
}

/// Role permission configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RolesConfig {
    /// Path prefixes only staff (admin, moderator) may access.
    pub restricted_prefixes: Vec<String>,
}

impl Default for RolesConfig {
    fn default() -> Self {
        Self {
            restricted_prefixes: vec!["/admin/".to_string()],
        }
    }
}

/// Message log configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MessagesConfig {
    /// Maximum message length in characters.
    pub max_content_len: usize,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            max_content_len: 4096,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
