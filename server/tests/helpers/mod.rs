//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for sending requests through the full axum router,
//! a recording `FakeMessenger` in place of the Graph API, and
//! `spawn_test_server` for tests that need a real socket.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{self, header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use parking_lot::Mutex;
use relay_server::api::{create_router, AppState};
use relay_server::config::Config;
use relay_server::messenger::{MessageSender, SendError, SentMessage};
use relay_server::webhooks::signing::{signature_header_value, SIGNATURE_HEADER};
use tokio::task::JoinHandle;
use tower::ServiceExt;

// ============================================================================
// Fake messenger
// ============================================================================

/// One recorded `send_text` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCall {
    pub access_token: String,
    pub recipient_id: String,
    pub text: String,
}

/// What the fake answers with.
#[derive(Debug, Clone)]
pub enum FakeReply {
    Accept(String),
    Reject(String),
}

/// In-process stand-in for the Send API.
#[derive(Debug)]
pub struct FakeMessenger {
    reply: Mutex<FakeReply>,
    calls: Mutex<Vec<SentCall>>,
}

impl FakeMessenger {
    pub fn new() -> Self {
        Self {
            reply: Mutex::new(FakeReply::Accept("m_fake".into())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_reply(&self, reply: FakeReply) {
        *self.reply.lock() = reply;
    }

    pub fn calls(&self) -> Vec<SentCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl MessageSender for FakeMessenger {
    async fn send_text(
        &self,
        access_token: &str,
        recipient_id: &str,
        text: &str,
    ) -> Result<SentMessage, SendError> {
        self.calls.lock().push(SentCall {
            access_token: access_token.into(),
            recipient_id: recipient_id.into(),
            text: text.into(),
        });
        match self.reply.lock().clone() {
            FakeReply::Accept(id) => Ok(SentMessage {
                message_id: Some(id),
                recipient_id: Some(recipient_id.into()),
            }),
            FakeReply::Reject(message) => Err(SendError::Platform {
                message,
                code: Some(100),
            }),
        }
    }
}

// ============================================================================
// Test App
// ============================================================================

/// A test application wrapping the full axum router.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub messenger: Arc<FakeMessenger>,
}

impl TestApp {
    /// Create a new test app with the default test config.
    pub fn new() -> Self {
        Self::with_config(Config::default_for_test())
    }

    /// Create a test app with a custom config.
    pub fn with_config(config: Config) -> Self {
        let messenger = Arc::new(FakeMessenger::new());
        let state = AppState::new(config, messenger.clone());
        let router = create_router(state.clone());
        Self {
            router,
            state,
            messenger,
        }
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }

    /// `POST` a JSON body.
    pub async fn post_json(&self, uri: &str, body: &serde_json::Value) -> Response<Body> {
        let request = Self::request(Method::POST, uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.oneshot(request).await
    }

    /// `GET` a URI.
    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.oneshot(Self::request(Method::GET, uri).body(Body::empty()).unwrap())
            .await
    }

    /// `POST /webhook` with a valid signature for `body`.
    pub async fn post_signed_webhook(&self, body: &str) -> Response<Body> {
        let signature = signature_header_value(&self.state.config.app_secret, body.as_bytes());
        let request = Self::request(Method::POST, "/webhook")
            .header(header::CONTENT_TYPE, "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.oneshot(request).await
    }

    /// Register an account and connect `page_id` to it; returns the user ID.
    pub async fn user_with_page(&self, email: &str, page_id: &str) -> String {
        let resp = self
            .post_json(
                "/api/register",
                &serde_json::json!({"name": "Test", "email": email, "password": "pw"}),
            )
            .await;
        assert_eq!(resp.status(), 200);
        let user_id = body_to_json(resp).await["user"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let resp = self
            .post_json(
                "/api/connect-page",
                &serde_json::json!({
                    "userId": user_id,
                    "pageId": page_id,
                    "pageName": "Test Page",
                    "pageAccessToken": format!("token-{page_id}")
                }),
            )
            .await;
        assert_eq!(resp.status(), 200);
        user_id
    }
}

/// Router around an arbitrary sender (e.g. the real Graph API client).
pub fn router_with_sender(sender: Arc<dyn MessageSender>) -> Router {
    create_router(AppState::new(Config::default_for_test(), sender))
}

/// Webhook body carrying one text message from `sender_id` to `page_id`.
pub fn message_webhook(page_id: &str, sender_id: &str, text: &str, timestamp: i64) -> String {
    serde_json::json!({
        "object": "page",
        "entry": [{
            "id": page_id,
            "time": timestamp,
            "messaging": [{
                "sender": {"id": sender_id},
                "recipient": {"id": page_id},
                "timestamp": timestamp,
                "message": {"mid": format!("mid.{timestamp}"), "text": text}
            }]
        }]
    })
    .to_string()
}

// ============================================================================
// Test Server
// ============================================================================

/// A running test server bound to a random port.
pub struct TestServer {
    /// Server address (127.0.0.1:PORT).
    pub addr: SocketAddr,
    /// Base URL for WebSocket connections (e.g., `ws://127.0.0.1:12345/ws`).
    pub ws_url: String,
    /// Handle to the server task for cleanup.
    _handle: JoinHandle<()>,
}

/// Spawn a real HTTP server on a random port.
///
/// Use this instead of `oneshot` for WebSocket tests, which need a real
/// upgrade.
pub async fn spawn_test_server(router: Router) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get local addr");
    let ws_url = format!("ws://{addr}/ws");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });

    TestServer {
        addr,
        ws_url,
        _handle: handle,
    }
}

/// Collect a response body as a string.
pub async fn body_to_string(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Collect a response body and parse it as JSON.
pub async fn body_to_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        let preview = String::from_utf8_lossy(&bytes);
        panic!("Failed to parse response as JSON: {e}\nBody: {preview}")
    })
}
