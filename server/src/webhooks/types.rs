//! Webhook Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use thiserror::Error;

use crate::ws::DispatchError;

/// Subscription handshake query (`hub.mode`, `hub.verify_token`, `hub.challenge`).
#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Webhook errors.
#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("Missing mode or token")]
    VerificationMissing,
    #[error("Verify token mismatch")]
    TokenMismatch,
    #[error("Missing signature")]
    MissingSignature,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    #[error("Unsupported object: {0}")]
    UnsupportedObject(String),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl From<WebhookError> for (StatusCode, String) {
    fn from(err: WebhookError) -> Self {
        match err {
            WebhookError::VerificationMissing | WebhookError::InvalidPayload(_) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            WebhookError::TokenMismatch => (StatusCode::FORBIDDEN, err.to_string()),
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                (StatusCode::UNAUTHORIZED, err.to_string())
            }
            WebhookError::UnsupportedObject(_) => (StatusCode::NOT_FOUND, err.to_string()),
            WebhookError::Dispatch(e) => {
                tracing::error!(error = %e, "Failed to dispatch webhook event");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        <(StatusCode, String)>::from(self).into_response()
    }
}
