//! Page HTTP Handlers

use axum::extract::State;
use axum::Json;
use tracing::info;

use super::error::PageError;
use super::types::{ConnectPageRequest, SuccessResponse};
use crate::api::AppState;

/// Connect a platform page to a dashboard user.
///
/// `POST /api/connect-page`
pub async fn connect_page(
    State(state): State<AppState>,
    Json(body): Json<ConnectPageRequest>,
) -> Result<Json<SuccessResponse>, PageError> {
    let (Some(user_id), Some(page_id), Some(token)) = (
        non_empty(body.user_id),
        non_empty(body.page_id),
        non_empty(body.page_access_token),
    ) else {
        return Err(PageError::MissingFields);
    };

    let page = state
        .pages
        .connect(user_id.as_str(), page_id, body.page_name, token);

    info!(
        user_id = %user_id,
        page_id = %page.page_id,
        page_name = page.page_name.as_deref().unwrap_or("-"),
        "Page connected"
    );

    Ok(Json(SuccessResponse { success: true }))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
