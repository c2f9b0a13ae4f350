//! Conversation API handlers.

use axum::extract::{Path, State};
use axum::Json;

use super::ConversationsResponse;
use crate::api::AppState;

/// List conversations for the page connected by `user_id`.
///
/// Users without a connected page get an empty list.
pub async fn list_conversations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<ConversationsResponse> {
    let conversations = state
        .pages
        .get(&user_id)
        .map(|page| state.conversations.list_for_page(&page.page_id))
        .unwrap_or_default();

    Json(ConversationsResponse { conversations })
}
