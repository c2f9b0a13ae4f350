//! Conversations
//!
//! Per-page message history fed by webhook events and read by the dashboard.

mod handlers;
mod store;
mod types;

use axum::{routing::get, Router};

use crate::api::AppState;

pub use store::{ConversationKey, ConversationStore};
pub use types::{
    Conversation, ConversationSummary, ConversationView, ConversationsResponse, StoredMessage,
    ATTACHMENT_PLACEHOLDER,
};

/// Conversation routes.
///
/// - GET /api/conversations/{user_id} - List conversations for the user's page
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/conversations/{user_id}",
        get(handlers::list_conversations),
    )
}
