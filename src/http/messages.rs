//! Chat message and health handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::messages::{Message, Page};
use crate::observability::metrics;
use crate::security::UserContext;

pub const ANONYMOUS_SENDER: &str = "anonymous";

/// Body of `POST /api/messages/`.
#[derive(Debug, Deserialize)]
pub struct NewMessage {
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub async fn create_message(
    State(state): State<AppState>,
    user: Option<Extension<UserContext>>,
    Json(body): Json<NewMessage>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let max_len = state.config.load().messages.max_content_len;
    let content = body.content.trim();

    if content.is_empty() {
        return Err(ApiError::BadRequest("Message content must not be empty.".into()));
    }
    if content.chars().count() > max_len {
        return Err(ApiError::BadRequest(format!(
            "Message content exceeds {} characters.",
            max_len
        )));
    }

    let sender = user
        .map(|Extension(ctx)| ctx.username)
        .unwrap_or_else(|| ANONYMOUS_SENDER.to_string());
    let message = state.messages.create(sender, content);
    metrics::record_message_created();
    tracing::debug!(id = %message.id, sender = %message.sender, "Message stored");

    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page>, ApiError> {
    let config = state.config.load();
    let page_size = match query.page_size {
        Some(0) | None => config.messages.default_page_size,
        Some(n) => n.min(config.messages.max_page_size),
    };
    let page = query.page.unwrap_or(1);

    state
        .messages
        .list(page, page_size)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Invalid page.".into()))
}
