//! Caller identity and role-based path restriction.
//!
//! Authentication happens upstream; the gateway trusts the `X-User` and
//! `X-User-Role` headers it forwards.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::path_matches;

pub const X_USER: &str = "x-user";
pub const X_USER_ROLE: &str = "x-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Moderator,
    Member,
}

impl Role {
    /// Unknown or missing roles are treated as plain members.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "moderator" => Role::Moderator,
            _ => Role::Member,
        }
    }

    pub fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::Moderator)
    }
}

/// Context attached to authenticated requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserContext {
    pub username: String,
    pub role: Role,
}

impl UserContext {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let username = headers.get(X_USER)?.to_str().ok()?.trim();
        if username.is_empty() {
            return None;
        }
        let role = headers
            .get(X_USER_ROLE)
            .and_then(|v| v.to_str().ok())
            .map(Role::parse)
            .unwrap_or(Role::Member);

        Some(Self {
            username: username.to_string(),
            role,
        })
    }
}

/// Attach a [`UserContext`] when the request carries a user header.
pub async fn identity_middleware(mut request: Request<Body>, next: Next) -> Response {
    if let Some(ctx) = UserContext::from_headers(request.headers()) {
        request.extensions_mut().insert(ctx);
    }
    next.run(request).await
}

/// Keep non-staff users out of restricted paths.
///
/// Anonymous requests are not checked here.
pub async fn role_permission_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let config = state.config.load_full();
    let path = request.uri().path();

    if let Some(ctx) = request.extensions().get::<UserContext>() {
        let restricted = config
            .roles
            .restricted_prefixes
            .iter()
            .any(|prefix| path_matches(prefix, path));

        if restricted && !ctx.role.is_staff() {
            tracing::warn!(user = %ctx.username, role = ?ctx.role, path = %path, "Role not permitted");
            metrics::record_access_denied("role");
            return (
                StatusCode::FORBIDDEN,
                "You do not have the necessary permissions to access this resource.",
            )
                .into_response();
        }
    }

    next.run(request).await
}
