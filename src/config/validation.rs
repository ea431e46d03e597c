//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and formats.
//! All errors are collected rather than stopping at the first one.

use std::net::SocketAddr;

use axum::http::Method;
use thiserror::Error;

use crate::config::schema::GateConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),

    #[error("{field}: hour {value} is out of range (0-23)")]
    HourOutOfRange { field: &'static str, value: u32 },

    #[error("rate_limit.methods: invalid HTTP method {0:?}")]
    InvalidMethod(String),

    #[error("rate_limit.methods must not be empty")]
    NoMethods,

    #[error("messages.default_page_size ({default}) exceeds messages.max_page_size ({max})")]
    PageSizeConflict { default: usize, max: usize },

    #[error("observability.log_format: expected \"pretty\" or \"json\", got {0:?}")]
    UnknownLogFormat(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::MustBePositive("timeouts.request_secs"));
    }

    let rl = &config.rate_limit;
    if rl.max_requests == 0 {
        errors.push(ValidationError::MustBePositive("rate_limit.max_requests"));
    }
    if rl.window_secs == 0 {
        errors.push(ValidationError::MustBePositive("rate_limit.window_secs"));
    }
    if rl.methods.is_empty() {
        errors.push(ValidationError::NoMethods);
    }
    for method in &rl.methods {
        if Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes()).is_err() {
            errors.push(ValidationError::InvalidMethod(method.clone()));
        }
    }

    let hours = &config.access_hours;
    if hours.start_hour > 23 {
        errors.push(ValidationError::HourOutOfRange {
            field: "access_hours.start_hour",
            value: hours.start_hour,
        });
    }
    if hours.end_hour > 23 {
        errors.push(ValidationError::HourOutOfRange {
            field: "access_hours.end_hour",
            value: hours.end_hour,
        });
    }

    let msgs = &config.messages;
    if msgs.max_content_len == 0 {
        errors.push(ValidationError::MustBePositive("messages.max_content_len"));
    }
    if msgs.default_page_size == 0 {
        errors.push(ValidationError::MustBePositive("messages.default_page_size"));
    } else if msgs.default_page_size > msgs.max_page_size {
        errors.push(ValidationError::PageSizeConflict {
            default: msgs.default_page_size,
            max: msgs.max_page_size,
        });
    }

    let obs = &config.observability;
    if !matches!(obs.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::UnknownLogFormat(obs.log_format.clone()));
    }
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: obs.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
