//! Graph API wire types and dashboard send-message types.

use serde::{Deserialize, Serialize};

/// Send API request body.
#[derive(Debug, Serialize)]
pub struct SendRequest<'a> {
    pub recipient: Recipient<'a>,
    pub message: OutgoingText<'a>,
    pub access_token: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Recipient<'a> {
    pub id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct OutgoingText<'a> {
    pub text: &'a str,
}

/// Send API response body. Either the ids or `error` is present.
#[derive(Debug, Default, Deserialize)]
pub struct GraphResponse {
    pub message_id: Option<String>,
    pub recipient_id: Option<String>,
    pub error: Option<GraphError>,
}

/// Error object reported by the platform.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphError {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub code: Option<i64>,
}

/// A message accepted by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub message_id: Option<String>,
    pub recipient_id: Option<String>,
}

/// Dashboard request to reply to a customer.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub user_id: Option<String>,
    pub recipient_id: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub success: bool,
    pub message_id: Option<String>,
}
