//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → roles.rs (identity: X-User / X-User-Role → UserContext)
//!     → access_hours.rs (reject /api/ during restricted hours)
//!     → rate_limit.rs (per-IP message window, client_ip.rs picks the key)
//!     → roles.rs (staff-only paths)
//!     → Pass to handlers
//! ```
//!
//! # Design Decisions
//! - Every check answers with 403 and a plain-text reason
//! - Policies read a config snapshot per request, so reloads apply cleanly

pub mod access_hours;
pub mod client_ip;
pub mod rate_limit;
pub mod roles;

pub use rate_limit::SlidingWindowLimiter;
pub use roles::{Role, UserContext};

/// Prefix match that also accepts the prefix without its trailing slash,
/// so "/api/messages/" covers both "/api/messages" and "/api/messages/42".
pub fn path_matches(prefix: &str, path: &str) -> bool {
    if path.starts_with(prefix) {
        return true;
    }
    let bare = prefix.trim_end_matches('/');
    !bare.is_empty() && path == bare
}
