//! Chat gateway: per-IP message rate limiting and access policies in front of
//! a message log.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod messages;
pub mod observability;
pub mod security;

pub use config::GateConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use security::SlidingWindowLimiter;
