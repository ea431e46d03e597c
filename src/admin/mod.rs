pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};

use self::auth::require_identity_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/rate-limits", get(get_rate_limits))
        .route_layer(middleware::from_fn(require_identity_middleware))
}
