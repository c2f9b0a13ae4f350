//! Webhook Ingress
//!
//! Receives the platform's page callbacks: the verify-token handshake and
//! HMAC-signed event batches.

pub mod events;
mod handlers;
pub mod ingest;
pub mod signing;
pub mod types;

use axum::{routing::get, Router};

use crate::api::AppState;

pub use types::{VerifyQuery, WebhookError};

/// Webhook routes.
///
/// - GET /webhook - Subscription handshake
/// - POST /webhook - Event callback
pub fn router() -> Router<AppState> {
    Router::new().route("/webhook", get(handlers::verify).post(handlers::receive))
}
