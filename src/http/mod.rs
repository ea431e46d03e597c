//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, request log)
//!     → security policies (identity, hours, rate limit, roles)
//!     → messages.rs / admin handlers
//!     → response.rs (security headers)
//!     → Send to client
//! ```

pub mod error;
pub mod messages;
pub mod request;
pub mod response;
pub mod server;

pub use error::ApiError;
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
