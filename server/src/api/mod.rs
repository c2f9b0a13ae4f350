//! API Router and Application State
//!
//! Central routing configuration and shared state.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::{
    auth::{self, AccountStore},
    config::Config,
    conversations::{self, ConversationStore},
    messenger::{self, MessageSender},
    pages::{self, PageDirectory},
    webhooks,
    ws::{self, ConnectionRegistry, Dispatcher},
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// Open dashboard connections
    pub registry: Arc<ConnectionRegistry>,
    /// Fan-out over `registry`
    pub dispatcher: Dispatcher,
    pub conversations: Arc<ConversationStore>,
    pub pages: Arc<PageDirectory>,
    pub accounts: Arc<AccountStore>,
    /// Outbound Send API client
    pub messenger: Arc<dyn MessageSender>,
    /// Cancelled once at process shutdown; parent of every connection's token
    pub shutdown: CancellationToken,
    pub started_at: Instant,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(config: Config, messenger: Arc<dyn MessageSender>) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        Self {
            config: Arc::new(config),
            dispatcher: Dispatcher::new(Arc::clone(&registry)),
            registry,
            conversations: Arc::new(ConversationStore::new()),
            pages: Arc::new(PageDirectory::new()),
            accounts: Arc::new(AccountStore::new()),
            messenger,
            shutdown: CancellationToken::new(),
            started_at: Instant::now(),
        }
    }

    /// Start the liveness sweeper; it stops when `shutdown` is cancelled.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        ws::spawn_sweeper(
            Arc::clone(&self.registry),
            self.config.sweep_interval(),
            self.config.connection_timeout(),
            self.shutdown.clone(),
        )
    }

    /// Cancel background work and close every open connection.
    ///
    /// Returns how many connections were closed.
    pub fn begin_shutdown(&self) -> usize {
        self.shutdown.cancel();
        let handles = self.registry.drain();
        for handle in &handles {
            handle.close();
        }
        handles.len()
    }
}

/// Error response body for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    let static_dir = state.config.static_dir.clone();
    let dashboard = ServeFile::new(format!("{static_dir}/index.html"));

    Router::new()
        // Status
        .route("/", get(server_status))
        .route("/health", get(health_check))
        .route("/api/webhook-info", get(webhook_info))
        // Platform callbacks
        .merge(webhooks::router())
        // Dashboard API
        .merge(auth::router())
        .merge(pages::router())
        .merge(conversations::router())
        .merge(messenger::router())
        // WebSocket
        .route("/ws", get(ws::handler))
        // Dashboard assets
        .route_service("/dashboard", dashboard)
        .fallback_service(ServeDir::new(static_dir))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        // State
        .with_state(state)
}

/// Root status response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    message: &'static str,
    status: &'static str,
    timestamp: DateTime<Utc>,
    /// Open WebSocket connections
    connected_clients: usize,
    /// Users with a connected page
    active_connections: usize,
}

async fn server_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Page relay server is running",
        status: "online",
        timestamp: Utc::now(),
        connected_clients: state.registry.len(),
        active_connections: state.pages.len(),
    })
}

/// Health check response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    /// Service status
    status: &'static str,
    /// Seconds since startup
    uptime: f64,
    timestamp: DateTime<Utc>,
    websocket_clients: usize,
    active_pages: usize,
    total_conversations: usize,
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        uptime: state.started_at.elapsed().as_secs_f64(),
        timestamp: Utc::now(),
        websocket_clients: state.registry.len(),
        active_pages: state.pages.len(),
        total_conversations: state.conversations.len(),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookInfoResponse {
    webhook_url: String,
    verify_token: String,
    status: &'static str,
}

/// Callback URL and verify token to paste into the platform's app settings.
async fn webhook_info(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<WebhookInfoResponse> {
    let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let scheme = header_str("x-forwarded-proto").unwrap_or("http");
    let host = header_str(header::HOST.as_str()).unwrap_or("localhost");

    Json(WebhookInfoResponse {
        webhook_url: format!("{scheme}://{host}/webhook"),
        verify_token: state.config.verify_token.clone(),
        status: "ready",
    })
}
