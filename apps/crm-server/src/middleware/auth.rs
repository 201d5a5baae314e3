//! Authentication middleware.

use std::sync::Arc;

use auth::{Claims, JwtManager};
use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use crm_store::CrmStore;
use serde_json::json;
use uuid::Uuid;

use crate::state::AppState;

/// Authenticated user information.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// User ID.
    pub id: Uuid,
    /// User email.
    pub email: String,
    /// User display name.
    pub name: Option<String>,
}

impl TryFrom<Claims> for AuthenticatedUser {
    type Error = auth::AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: claims.user_id()?,
            email: claims.email,
            name: claims.name,
        })
    }
}

/// Extracts the bearer token from an Authorization header value.
fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
}

fn authenticate(jwt_manager: &JwtManager, token: &str) -> Option<AuthenticatedUser> {
    let claims = jwt_manager.validate_token(token).ok()?;
    AuthenticatedUser::try_from(claims).ok()
}

/// Authentication middleware.
///
/// Validates the bearer token and stores the [`AuthenticatedUser`] in the
/// request extensions. Requests without a valid token never reach the
/// handler.
pub async fn auth_middleware<S: CrmStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token);

    let Some(token) = token else {
        tracing::debug!("No authentication token provided");
        return unauthorized("Unauthorized");
    };

    let Some(user) = authenticate(&state.jwt_manager, token) else {
        tracing::debug!("Authentication failed");
        return unauthorized("Invalid token");
    };

    tracing::debug!(user_id = %user.id, "Authenticated user");
    request.extensions_mut().insert(user);
    next.run(request).await
}
