//! Page Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A platform page connected by a dashboard user.
///
/// Holds the page access token, so it is never serialized back to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConnection {
    pub page_id: String,
    pub page_name: Option<String>,
    pub page_access_token: String,
    pub connected_at: DateTime<Utc>,
}

/// Request to connect a page.
///
/// Fields are optional at the wire level so missing values map to a
/// `400 Missing required fields` instead of a deserialization rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectPageRequest {
    pub user_id: Option<String>,
    pub page_id: Option<String>,
    pub page_name: Option<String>,
    pub page_access_token: Option<String>,
}

/// Generic `{ "success": true }` body.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}
