//! Authentication API endpoints.

use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use crm_store::CrmStore;
use entities::User;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

/// Development login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Issued access token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub user: User,
}

/// Issues a token for `email`, creating the user on first login.
///
/// Only available when development login is enabled; there is no password.
pub async fn login<S: CrmStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<LoginRequest>,
) -> ServerResult<Json<LoginResponse>> {
    if !state.config.dev_login {
        return Err(ServerError::NotFound("Login is not enabled".to_string()));
    }

    let email = request.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ServerError::InvalidRequest("A valid email is required".to_string()));
    }

    let user = match state.store.get_user_by_email(email).await? {
        Some(user) => user,
        None => {
            let mut user = User::new(email);
            if let Some(name) = request.name.filter(|name| !name.trim().is_empty()) {
                user = user.with_name(name);
            }
            let user = state.store.create_user(user).await?;
            tracing::info!(user_id = %user.id, "User created");
            user
        }
    };

    let access_token =
        state
            .jwt_manager
            .generate_token(user.id, user.email.clone(), user.name.clone())?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.jwt_manager.expiration_seconds(),
        user,
    }))
}

/// Gets the current authenticated user.
pub async fn get_current_user<S: CrmStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ServerResult<Json<User>> {
    let user = state
        .store
        .get_user(user.id)
        .await?
        .ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
