//! Interaction API endpoints.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use crm_store::{CrmStore, InteractionFilter};
use entities::{CreateInteractionInput, Interaction, UpdateInteractionInput};
use serde::Deserialize;
use uuid::Uuid;

use super::contacts::owned_contact;
use crate::error::{ServerError, ServerResult};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

/// Query parameters for listing interactions.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionsQuery {
    pub contact_id: Option<String>,
}

async fn owned_interaction<S: CrmStore>(
    state: &AppState<S>,
    user: &AuthenticatedUser,
    id: &str,
) -> ServerResult<Interaction> {
    let not_found = || ServerError::NotFound("Interaction not found".to_string());

    let id: Uuid = id.parse().map_err(|_| not_found())?;
    let interaction = state
        .store
        .get_interaction(id)
        .await?
        .ok_or_else(not_found)?;

    if interaction.user_id != user.id {
        return Err(ServerError::Forbidden);
    }
    Ok(interaction)
}

/// Lists one contact's interactions, newest first.
pub async fn list_interactions<S: CrmStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<InteractionsQuery>,
) -> ServerResult<Json<Vec<Interaction>>> {
    let Some(contact_id) = query.contact_id.filter(|id| !id.is_empty()) else {
        return Err(ServerError::InvalidRequest(
            "contactId query parameter is required".to_string(),
        ));
    };

    owned_contact(&state, &user, &contact_id).await?;

    let interactions = state
        .store
        .list_interactions(InteractionFilter {
            user_id: Some(user.id),
            contact_id: Some(contact_id),
        })
        .await?;

    Ok(Json(interactions))
}

/// Records an interaction and stamps the contact's last-contact date.
pub async fn create_interaction<S: CrmStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(input): Json<CreateInteractionInput>,
) -> ServerResult<Json<Interaction>> {
    let (Some(contact_id), Some(body)) = (
        input.contact_id.filter(|id| !id.is_empty()),
        input.body.filter(|body| !body.is_empty()),
    ) else {
        return Err(ServerError::InvalidRequest(
            "contactId and body are required".to_string(),
        ));
    };

    let mut contact = owned_contact(&state, &user, &contact_id).await?;

    let interaction = Interaction::new(user.id, contact_id, body)
        .with_title(input.title.unwrap_or_default())
        .with_date(input.date.unwrap_or_else(Utc::now));
    let interaction = state.store.create_interaction(interaction).await?;

    contact.last_contact = Some(interaction.date);
    state.store.update_contact(contact).await?;

    tracing::info!(
        interaction_id = %interaction.id,
        contact_id = %interaction.contact_id,
        "Interaction created"
    );

    Ok(Json(interaction))
}

/// Applies a partial update to one of the caller's interactions.
pub async fn update_interaction<S: CrmStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(input): Json<UpdateInteractionInput>,
) -> ServerResult<Json<Interaction>> {
    let mut interaction = owned_interaction(&state, &user, &id).await?;

    interaction.apply(&input);
    let interaction = state.store.update_interaction(interaction).await?;

    tracing::info!(interaction_id = %interaction.id, "Interaction updated");

    Ok(Json(interaction))
}

/// Deletes one of the caller's interactions.
pub async fn delete_interaction<S: CrmStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ServerResult<StatusCode> {
    let interaction = owned_interaction(&state, &user, &id).await?;
    state.store.delete_interaction(interaction.id).await?;

    tracing::info!(interaction_id = %interaction.id, "Interaction deleted");

    Ok(StatusCode::NO_CONTENT)
}
