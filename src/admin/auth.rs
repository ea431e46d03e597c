use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::security::UserContext;

/// Operator endpoints need a known caller. Staff checks happen in the
/// role permission layer; this only turns away anonymous requests.
pub async fn require_identity_middleware(
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    if request.extensions().get::<UserContext>().is_none() {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(request).await)
}
