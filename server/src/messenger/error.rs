//! Messenger Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::ErrorResponse;

/// Failure of one outbound send. Never retried.
#[derive(Debug, Error)]
pub enum SendError {
    /// The platform answered with an error object.
    #[error("platform error: {message}")]
    Platform { message: String, code: Option<i64> },

    /// The request could not be sent or the response not decoded.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Errors surfaced by `POST /api/send-message`.
#[derive(Debug, Error)]
pub enum MessengerError {
    #[error("Missing required data")]
    MissingData,

    #[error("{0}")]
    Platform(String),

    #[error("Failed to send message")]
    Transport,
}

impl From<SendError> for MessengerError {
    fn from(err: SendError) -> Self {
        match err {
            SendError::Platform { message, .. } => Self::Platform(message),
            SendError::Transport(_) => Self::Transport,
        }
    }
}

impl IntoResponse for MessengerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingData | Self::Platform(_) => StatusCode::BAD_REQUEST,
            Self::Transport => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
