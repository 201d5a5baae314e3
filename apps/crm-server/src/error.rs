//! Server error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use auth::AuthError;
use crm_store::CrmStoreError;
use serde_json::json;

/// Server error type.
///
/// Every variant renders as `{"error": <message>}` with the matching status.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid request parameters.
    #[error("{0}")]
    InvalidRequest(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// The resource belongs to another user.
    #[error("Forbidden")]
    Forbidden,

    /// Store error.
    #[error("Database error: {0}")]
    Database(#[from] CrmStoreError),

    /// Authentication error.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Forbidden => StatusCode::FORBIDDEN,
            ServerError::Database(CrmStoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ServerError::Database(CrmStoreError::AlreadyExists { .. }) => StatusCode::CONFLICT,
            // Failing to issue a token is our fault, not the caller's.
            ServerError::Auth(AuthError::JwtEncoding(_) | AuthError::Configuration(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServerError::Auth(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
