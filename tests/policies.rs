//! Router-level tests for the middleware stack, without a socket.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chat_gate::http::HttpServer;
use chrono::Timelike;
use tower::ServiceExt;

mod common;

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_as(uri: &str, user: &str, role: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-user", user)
        .header("x-user-role", role)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_requests_without_peer_share_fallback_bucket() {
    let mut config = common::test_config();
    config.rate_limit.max_requests = 2;
    let server = HttpServer::new(config);

    for _ in 0..2 {
        let res = server
            .app()
            .oneshot(common::post_message("/api/messages/", None, "hi"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = server
        .app()
        .oneshot(common::post_message("/api/messages/", Some("garbage"), "hi"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let usage = server.state().limiter.snapshot(std::time::Instant::now());
    assert_eq!(usage.len(), 1);
    assert_eq!(usage[0].client, "unknown");
}

#[tokio::test]
async fn test_message_validation() {
    let server = HttpServer::new(common::test_config());

    let res = server
        .app()
        .oneshot(common::post_message("/api/messages/", Some("10.1.1.1"), "   "))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::body_text(res).await, "Message content must not be empty.");

    let long = "x".repeat(4097);
    let res = server
        .app()
        .oneshot(common::post_message("/api/messages/", Some("10.1.1.2"), &long))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(server.state().messages.is_empty());
}

#[tokio::test]
async fn test_sender_comes_from_identity() {
    let server = HttpServer::new(common::test_config());

    let mut request = common::post_message("/api/messages/", Some("10.2.2.2"), "hello");
    request.headers_mut().insert("x-user", "alice".parse().unwrap());
    let res = server.app().oneshot(request).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = serde_json::from_str(&common::body_text(res).await).unwrap();
    assert_eq!(body["sender"], "alice");
    assert_eq!(body["content"], "hello");

    let res = server
        .app()
        .oneshot(common::post_message("/api/messages/", Some("10.2.2.3"), "hey"))
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_str(&common::body_text(res).await).unwrap();
    assert_eq!(body["sender"], "anonymous");
}

#[tokio::test]
async fn test_pagination() {
    let server = HttpServer::new(common::test_config());
    for i in 0..25 {
        server.state().messages.create("bob", format!("m{i}"));
    }

    let res = server.app().oneshot(get("/api/messages/")).await.unwrap();
    let page: serde_json::Value = serde_json::from_str(&common::body_text(res).await).unwrap();
    assert_eq!(page["count"], 25);
    assert_eq!(page["page_size"], 20);
    assert_eq!(page["results"].as_array().unwrap().len(), 20);
    assert_eq!(page["results"][0]["content"], "m24");

    let res = server
        .app()
        .oneshot(get("/api/messages/?page=2"))
        .await
        .unwrap();
    let page: serde_json::Value = serde_json::from_str(&common::body_text(res).await).unwrap();
    assert_eq!(page["results"].as_array().unwrap().len(), 5);

    let res = server
        .app()
        .oneshot(get("/api/messages/?page_size=500"))
        .await
        .unwrap();
    let page: serde_json::Value = serde_json::from_str(&common::body_text(res).await).unwrap();
    assert_eq!(page["page_size"], 100);

    let res = server
        .app()
        .oneshot(get("/api/messages/?page=3"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(common::body_text(res).await, "Invalid page.");
}

#[tokio::test]
async fn test_admin_requires_staff() {
    let server = HttpServer::new(common::test_config());

    let res = server.app().oneshot(get("/admin/status")).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .app()
        .oneshot(get_as("/admin/status", "carol", "member"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        common::body_text(res).await,
        "You do not have the necessary permissions to access this resource."
    );

    let res = server
        .app()
        .oneshot(get_as("/admin/status", "dave", "moderator"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let status: serde_json::Value = serde_json::from_str(&common::body_text(res).await).unwrap();
    assert_eq!(status["status"], "operational");
    assert_eq!(status["messages"], 0);
}

#[tokio::test]
async fn test_members_can_still_use_chat_api() {
    let server = HttpServer::new(common::test_config());
    let res = server
        .app()
        .oneshot(get_as("/api/messages/", "carol", "member"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_access_hours_block_api_only() {
    // Two hours wide, so crossing an hour boundary mid-test stays inside.
    let hour = chrono::Local::now().hour();
    let mut config = common::test_config();
    config.access_hours.enabled = true;
    config.access_hours.start_hour = hour;
    config.access_hours.end_hour = (hour + 2) % 24;
    let server = HttpServer::new(config);

    let res = server.app().oneshot(get("/api/messages/")).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert!(common::body_text(res)
        .await
        .starts_with("Access to chat is restricted between"));

    let res = server.app().oneshot(get("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_access_hours_disabled_by_default() {
    let mut config = chat_gate::GateConfig::default();
    config.access_hours.start_hour = 0;
    config.access_hours.end_hour = 23;
    let server = HttpServer::new(config);

    let res = server.app().oneshot(get("/api/messages/")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_response_headers() {
    let server = HttpServer::new(common::test_config());

    let res = server.app().oneshot(get("/health")).await.unwrap();
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.headers()["x-content-type-options"], "nosniff");

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let res = server.app().oneshot(request).await.unwrap();
    assert_eq!(res.headers()["x-request-id"], "abc-123");
}
