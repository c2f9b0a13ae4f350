//! Authentication HTTP Handlers

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::{AuthError, AuthResult};
use super::store::Account;
use crate::api::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Public account fields.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<Account> for UserProfile {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
        }
    }
}

/// Response for register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserProfile,
}

// ============================================================================
// Handlers
// ============================================================================

/// Register a new dashboard account.
///
/// `POST /api/register`
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AuthResult<Json<AuthResponse>> {
    if body.email.is_empty() || body.password.is_empty() {
        return Err(AuthError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let accounts = state.accounts.clone();
    let account = tokio::task::spawn_blocking(move || {
        accounts.register(&body.name, &body.email, &body.password)
    })
    .await
    .map_err(|_| AuthError::PasswordHash)??;

    info!(user_id = %account.id, "Account registered");

    Ok(Json(AuthResponse {
        success: true,
        user: account.into(),
    }))
}

/// Log in with email and password.
///
/// `POST /api/login`
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AuthResult<Json<AuthResponse>> {
    let accounts = state.accounts.clone();
    let account =
        tokio::task::spawn_blocking(move || accounts.login(&body.email, &body.password))
            .await
            .map_err(|_| AuthError::PasswordHash)??;

    Ok(Json(AuthResponse {
        success: true,
        user: account.into(),
    }))
}
