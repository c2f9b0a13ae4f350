//! Connected Pages
//!
//! Tracks which platform page each dashboard user has connected, and
//! resolves the owner of a page for webhook fan-out.

mod directory;
mod error;
mod handlers;
mod types;

use axum::{routing::post, Router};

use crate::api::AppState;

pub use directory::PageDirectory;
pub use error::PageError;
pub use types::{ConnectPageRequest, PageConnection, SuccessResponse};

/// Page routes.
///
/// - POST /api/connect-page - Connect a page for a user
pub fn router() -> Router<AppState> {
    Router::new().route("/api/connect-page", post(handlers::connect_page))
}
