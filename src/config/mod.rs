//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//!     → shared via ArcSwap in the HTTP state
//!
//! With --watch:
//!     watcher.rs detects change, waits for the burst to settle
//!     → loader.rs loads new config (empty file skipped)
//!     → validation.rs validates
//!     → atomic swap of Arc<GateConfig>, limiter limits updated
//! ```

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AccessHoursConfig, GateConfig, ListenerConfig, MessagesConfig, ObservabilityConfig,
    RateLimitConfig, RolesConfig, SecurityConfig, TimeoutConfig,
};
