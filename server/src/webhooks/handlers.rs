//! Webhook HTTP Handlers
//!
//! Subscription handshake and signed event callbacks.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use tracing::{debug, info, warn};

use super::events::WebhookPayload;
use super::ingest::process_payload;
use super::signing::{verify_signature, SIGNATURE_HEADER};
use super::types::{VerifyQuery, WebhookError};
use crate::api::AppState;

/// Subscription handshake.
///
/// `GET /webhook?hub.mode=subscribe&hub.verify_token=..&hub.challenge=..`
pub async fn verify(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<(StatusCode, String), WebhookError> {
    let (Some(mode), Some(token)) = (query.mode.as_deref(), query.verify_token.as_deref()) else {
        warn!("Webhook verification missing mode or token");
        return Err(WebhookError::VerificationMissing);
    };

    if mode != "subscribe" || token != state.config.verify_token {
        warn!(mode, "Webhook verification token mismatch");
        return Err(WebhookError::TokenMismatch);
    }

    info!("Webhook verified");
    Ok((StatusCode::OK, query.challenge.unwrap_or_default()))
}

/// Signed event callback.
///
/// `POST /webhook`. The signature covers the raw body, so it is checked
/// before the body is parsed.
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            warn!("Webhook missing signature");
            WebhookError::MissingSignature
        })?;

    if !verify_signature(&state.config.app_secret, &body, signature) {
        warn!("Webhook signature mismatch");
        return Err(WebhookError::InvalidSignature);
    }

    let payload: WebhookPayload = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Webhook body is not a valid payload");
        WebhookError::InvalidPayload(e)
    })?;

    if payload.object != "page" {
        debug!(object = %payload.object, "Ignoring non-page webhook");
        return Err(WebhookError::UnsupportedObject(payload.object));
    }

    let summary = process_payload(&state, &payload)?;
    debug!(
        entries = payload.entry.len(),
        messages = summary.messages,
        postbacks = summary.postbacks,
        echoes = summary.echoes,
        skipped = summary.skipped,
        "Webhook processed"
    );

    Ok((StatusCode::OK, "EVENT_RECEIVED"))
}
