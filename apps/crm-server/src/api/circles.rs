//! Circle API endpoints.

use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use chrono::Utc;
use crm_store::CrmStore;
use entities::{Circle, CircleInput};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ServerError, ServerResult};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

/// Response of `POST /api/circles/init`.
#[derive(Debug, Serialize)]
pub struct InitCirclesResponse {
    pub message: &'static str,
    pub circles: Vec<Circle>,
}

/// Lists the caller's circles by display order.
pub async fn list_circles<S: CrmStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ServerResult<Json<Vec<Circle>>> {
    Ok(Json(state.store.list_circles(user.id).await?))
}

/// Creates or updates circles by name.
///
/// The body is `{"circles": [...]}`. A missing name creates nothing and
/// fails the request before any circle is written.
pub async fn upsert_circles<S: CrmStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<Value>,
) -> ServerResult<Json<Vec<Circle>>> {
    let Some(Value::Array(items)) = body.get("circles") else {
        return Err(ServerError::InvalidRequest(
            "circles must be an array".to_string(),
        ));
    };

    let inputs = items
        .iter()
        .map(|item| serde_json::from_value::<CircleInput>(item.clone()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::InvalidRequest(format!("Invalid circle: {e}")))?;

    let mut results = Vec::with_capacity(inputs.len());
    for input in inputs {
        let order = input.order.unwrap_or(0);
        let circle = match state.store.get_circle_by_name(user.id, &input.name).await? {
            Some(mut circle) => {
                if let Some(is_active) = input.is_active {
                    circle.is_active = is_active;
                }
                circle.order = order;
                circle.updated_at = Utc::now();
                state.store.update_circle(circle).await?
            }
            None => {
                let circle = Circle::new(user.id, input.name)
                    .with_active(input.is_active.unwrap_or(true))
                    .with_order(order);
                state.store.create_circle(circle).await?
            }
        };
        results.push(circle);
    }

    tracing::info!(user_id = %user.id, count = results.len(), "Circles upserted");

    Ok(Json(results))
}

/// Creates the default circle set unless the caller already has circles.
pub async fn init_circles<S: CrmStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ServerResult<Json<InitCirclesResponse>> {
    let existing = state.store.list_circles(user.id).await?;
    if !existing.is_empty() {
        return Ok(Json(InitCirclesResponse {
            message: "Circles already initialized",
            circles: existing,
        }));
    }

    let mut circles = Vec::new();
    for circle in Circle::defaults_for(user.id) {
        circles.push(state.store.create_circle(circle).await?);
    }

    tracing::info!(user_id = %user.id, "Default circles created");

    Ok(Json(InitCirclesResponse {
        message: "Circles initialized",
        circles,
    }))
}
