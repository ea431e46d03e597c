//! End-to-end rate limiting against a live gateway.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;

mod common;

#[tokio::test]
async fn test_sixth_message_from_one_ip_is_rejected() {
    let gateway = common::start_gateway(common::test_config()).await;
    let client = common::client();
    let url = gateway.url("/api/messages/");

    for i in 0..5 {
        let res = client
            .post(&url)
            .header("x-forwarded-for", "203.0.113.1")
            .json(&json!({ "content": format!("hello {i}") }))
            .send()
            .await
            .expect("gateway unreachable");
        assert_eq!(res.status(), StatusCode::CREATED, "message {i} should be admitted");
    }

    let res = client
        .post(&url)
        .header("x-forwarded-for", "203.0.113.1")
        .json(&json!({ "content": "one too many" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let retry_after: u64 = res.headers()["retry-after"].to_str().unwrap().parse().unwrap();
    assert!((1..=60).contains(&retry_after));
    assert_eq!(
        res.text().await.unwrap(),
        "Rate limit exceeded: You can send only 5 messages per 1 minute."
    );

    // A different client is unaffected.
    let res = client
        .post(&url)
        .header("x-forwarded-for", "203.0.113.2, 10.0.0.1")
        .json(&json!({ "content": "hi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // Reads are never limited.
    let res = client
        .get(&url)
        .header("x-forwarded-for", "203.0.113.1")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: serde_json::Value = res.json().await.unwrap();
    assert_eq!(page["count"], 6);

    gateway.shutdown.trigger();
}

#[tokio::test]
async fn test_client_is_admitted_again_after_window() {
    let mut config = common::test_config();
    config.rate_limit.max_requests = 2;
    config.rate_limit.window_secs = 1;
    let gateway = common::start_gateway(config).await;
    let client = common::client();
    let url = gateway.url("/api/messages");

    let send = || {
        client
            .post(&url)
            .header("x-forwarded-for", "198.51.100.4")
            .json(&json!({ "content": "ping" }))
            .send()
    };

    assert_eq!(send().await.unwrap().status(), StatusCode::CREATED);
    assert_eq!(send().await.unwrap().status(), StatusCode::CREATED);
    let rejected = send().await.unwrap();
    assert_eq!(rejected.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        rejected.text().await.unwrap(),
        "Rate limit exceeded: You can send only 2 messages per 1 second."
    );

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(send().await.unwrap().status(), StatusCode::CREATED);

    gateway.shutdown.trigger();
}

#[tokio::test]
async fn test_untrusted_forwarded_for_uses_peer_address() {
    let mut config = common::test_config();
    config.rate_limit.max_requests = 2;
    config.rate_limit.trust_forwarded_for = false;
    let gateway = common::start_gateway(config).await;
    let client = common::client();
    let url = gateway.url("/api/messages/");

    for spoofed in ["192.0.2.1", "192.0.2.2"] {
        let res = client
            .post(&url)
            .header("x-forwarded-for", spoofed)
            .json(&json!({ "content": "x" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    // All three share the loopback peer address.
    let res = client
        .post(&url)
        .header("x-forwarded-for", "192.0.2.3")
        .json(&json!({ "content": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let report: serde_json::Value = client
        .get(gateway.url("/admin/rate-limits"))
        .header("x-user", "ops")
        .header("x-user-role", "admin")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report["clients"][0]["client"], "127.0.0.1");
    assert_eq!(report["clients"][0]["recent_requests"], 2);

    gateway.shutdown.trigger();
}

#[tokio::test]
async fn test_reload_changes_limit() {
    let mut config = common::test_config();
    config.rate_limit.max_requests = 1;
    let gateway = common::start_gateway(config.clone()).await;
    let client = common::client();
    let url = gateway.url("/api/messages/");

    let send = || {
        client
            .post(&url)
            .header("x-forwarded-for", "198.51.100.9")
            .json(&json!({ "content": "ping" }))
            .send()
    };

    assert_eq!(send().await.unwrap().status(), StatusCode::CREATED);
    assert_eq!(send().await.unwrap().status(), StatusCode::FORBIDDEN);

    config.rate_limit.max_requests = 3;
    gateway.config_tx.send(config.clone()).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(send().await.unwrap().status(), StatusCode::CREATED);
    assert_eq!(send().await.unwrap().status(), StatusCode::CREATED);
    assert_eq!(send().await.unwrap().status(), StatusCode::FORBIDDEN);

    config.rate_limit.enabled = false;
    gateway.config_tx.send(config).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(send().await.unwrap().status(), StatusCode::CREATED);

    gateway.shutdown.trigger();
}
