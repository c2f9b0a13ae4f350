//! Dashboard Accounts
//!
//! Local email/password accounts held in memory.

mod error;
mod handlers;
mod password;
mod store;

use axum::{routing::post, Router};

use crate::api::AppState;

pub use error::{AuthError, AuthResult};
pub use handlers::{AuthResponse, UserProfile};
pub use store::{Account, AccountStore};

/// Create authentication router.
///
/// - POST /api/register - Register a new account
/// - POST /api/login - Login with email/password
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(handlers::register))
        .route("/api/login", post(handlers::login))
}
