//! HTTP integration tests for the dashboard API.

mod helpers;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, StatusCode};
use helpers::{body_to_json, router_with_sender, FakeReply, SentCall, TestApp};
use relay_server::config::Config;
use relay_server::messenger::GraphApiClient;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_register_and_login() {
    let app = TestApp::new();

    let resp = app
        .post_json(
            "/api/register",
            &json!({"name": "Ada", "email": "ada@example.com", "password": "secret"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let registered = body_to_json(resp).await;
    assert_eq!(registered["success"], true);
    assert_eq!(registered["user"]["name"], "Ada");
    assert!(registered["user"].get("password").is_none());
    assert!(registered["user"].get("passwordHash").is_none());

    let resp = app
        .post_json(
            "/api/login",
            &json!({"email": "ada@example.com", "password": "secret"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let logged_in = body_to_json(resp).await;
    assert_eq!(logged_in["user"]["id"], registered["user"]["id"]);
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let app = TestApp::new();
    let body = json!({"name": "Ada", "email": "dup@example.com", "password": "pw"});
    app.post_json("/api/register", &body).await;

    let resp = app.post_json("/api/register", &body).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_to_json(resp).await, json!({"error": "Email already exists"}));
}

#[tokio::test]
async fn test_login_with_bad_credentials() {
    let app = TestApp::new();
    app.post_json(
        "/api/register",
        &json!({"name": "Ada", "email": "ada@example.com", "password": "pw"}),
    )
    .await;

    let resp = app
        .post_json("/api/login", &json!({"email": "ada@example.com", "password": "bad"}))
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_to_json(resp).await, json!({"error": "Invalid credentials"}));

    let resp = app
        .post_json("/api/login", &json!({"email": "nobody@example.com", "password": "pw"}))
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_connect_page_requires_fields() {
    let app = TestApp::new();
    let resp = app
        .post_json("/api/connect-page", &json!({"userId": "u1", "pageId": "p1"}))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_to_json(resp).await,
        json!({"error": "Missing required fields"})
    );
    assert!(app.state.pages.is_empty());
}

#[tokio::test]
async fn test_conversations_for_user_without_page_is_empty() {
    let app = TestApp::new();
    let resp = app.get("/api/conversations/unknown-user").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_to_json(resp).await, json!({"conversations": []}));
}

#[tokio::test]
async fn test_send_message_uses_page_token() {
    let app = TestApp::new();
    let user_id = app.user_with_page("sender@example.com", "p1").await;

    let resp = app
        .post_json(
            "/api/send-message",
            &json!({"userId": user_id, "recipientId": "s1", "text": "hello back"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_to_json(resp).await,
        json!({"success": true, "messageId": "m_fake"})
    );
    assert_eq!(
        app.messenger.calls(),
        vec![SentCall {
            access_token: "token-p1".into(),
            recipient_id: "s1".into(),
            text: "hello back".into(),
        }]
    );
}

#[tokio::test]
async fn test_send_message_missing_data() {
    let app = TestApp::new();
    let user_id = app.user_with_page("missing@example.com", "p1").await;

    for body in [
        json!({"userId": user_id, "recipientId": "s1"}),
        json!({"userId": user_id, "text": "hi"}),
        json!({"userId": "no-page", "recipientId": "s1", "text": "hi"}),
    ] {
        let resp = app.post_json("/api/send-message", &body).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_to_json(resp).await, json!({"error": "Missing required data"}));
    }
    assert!(app.messenger.calls().is_empty());
}

#[tokio::test]
async fn test_send_message_platform_error_is_surfaced() {
    let app = TestApp::new();
    let user_id = app.user_with_page("rejected@example.com", "p1").await;
    app.messenger
        .set_reply(FakeReply::Reject("(#100) No matching user found".into()));

    let resp = app
        .post_json(
            "/api/send-message",
            &json!({"userId": user_id, "recipientId": "s1", "text": "hi"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_to_json(resp).await,
        json!({"error": "(#100) No matching user found"})
    );
}

#[tokio::test]
async fn test_send_message_transport_failure_is_server_error() {
    // Default test config points the Graph API at a closed port
    let client = GraphApiClient::new(&Config::default_for_test()).unwrap();
    let router = router_with_sender(Arc::new(client));

    let post = |uri: &str, body: serde_json::Value| {
        axum::http::Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    };

    let resp = router
        .clone()
        .oneshot(post(
            "/api/connect-page",
            json!({"userId": "u1", "pageId": "p1", "pageAccessToken": "tok"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = router
        .oneshot(post(
            "/api/send-message",
            json!({"userId": "u1", "recipientId": "s1", "text": "hi"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_to_json(resp).await, json!({"error": "Failed to send message"}));
}

#[tokio::test]
async fn test_status_and_health() {
    let app = TestApp::new();
    app.user_with_page("status@example.com", "p1").await;

    let status = body_to_json(app.get("/").await).await;
    assert_eq!(status["status"], "online");
    assert_eq!(status["connectedClients"], 0);
    assert_eq!(status["activeConnections"], 1);

    let health = body_to_json(app.get("/health").await).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["activePages"], 1);
    assert_eq!(health["totalConversations"], 0);
    assert!(health["uptime"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_webhook_info_uses_forwarded_proto() {
    let app = TestApp::new();
    let request = TestApp::request(Method::GET, "/api/webhook-info")
        .header(header::HOST, "relay.example.com")
        .header("x-forwarded-proto", "https")
        .body(Body::empty())
        .unwrap();

    let json = body_to_json(app.oneshot(request).await).await;
    assert_eq!(
        json,
        json!({
            "webhookUrl": "https://relay.example.com/webhook",
            "verifyToken": "test-verify-token",
            "status": "ready"
        })
    );
}

#[tokio::test]
async fn test_dashboard_is_served_from_static_dir() {
    let mut config = Config::default_for_test();
    config.static_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/public").into();
    let app = TestApp::with_config(config);

    let resp = app.get("/dashboard").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = helpers::body_to_string(resp).await;
    assert!(body.contains("Page Relay"));
    assert!(body.contains("clearInterval(keepAlive)"));

    assert_eq!(app.get("/index.html").await.status(), StatusCode::OK);
    assert_eq!(app.get("/missing.css").await.status(), StatusCode::NOT_FOUND);
}
