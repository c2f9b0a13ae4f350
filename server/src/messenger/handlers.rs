//! Send-message HTTP handler.

use axum::extract::State;
use axum::Json;
use tracing::{error, info};

use super::error::{MessengerError, SendError};
use super::types::{SendMessageRequest, SendMessageResponse};
use crate::api::AppState;

/// Reply to a customer from the user's connected page.
///
/// `POST /api/send-message`
pub async fn send_message(
    State(state): State<AppState>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, MessengerError> {
    let page = body
        .user_id
        .as_deref()
        .and_then(|user_id| state.pages.get(user_id));
    let (Some(page), Some(recipient_id), Some(text)) = (
        page,
        body.recipient_id.filter(|r| !r.is_empty()),
        body.text.filter(|t| !t.is_empty()),
    ) else {
        return Err(MessengerError::MissingData);
    };

    let sent = state
        .messenger
        .send_text(&page.page_access_token, &recipient_id, &text)
        .await
        .map_err(|e| {
            if let SendError::Transport(ref cause) = e {
                error!(error = %cause, page_id = %page.page_id, "Send message failed");
            }
            MessengerError::from(e)
        })?;

    info!(
        page_id = %page.page_id,
        recipient_id = %recipient_id,
        message_id = sent.message_id.as_deref().unwrap_or("-"),
        "Message sent"
    );

    Ok(Json(SendMessageResponse {
        success: true,
        message_id: sent.message_id,
    }))
}
