//! Outbound Messenger
//!
//! Replies from the dashboard go out through the platform's Send API.
//! Sending sits behind [`MessageSender`] so tests can substitute a fake and
//! a retrying sender can wrap the real one.

mod client;
mod error;
mod handlers;
mod types;

use async_trait::async_trait;
use axum::{routing::post, Router};

use crate::api::AppState;

pub use client::GraphApiClient;
pub use error::{MessengerError, SendError};
pub use types::{GraphError, GraphResponse, SendMessageRequest, SendMessageResponse, SentMessage};

/// Sends a text message on behalf of a page.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_text(
        &self,
        access_token: &str,
        recipient_id: &str,
        text: &str,
    ) -> Result<SentMessage, SendError>;
}

/// Messenger routes.
///
/// - POST /api/send-message - Send a reply to a customer
pub fn router() -> Router<AppState> {
    Router::new().route("/api/send-message", post(handlers::send_message))
}
