//! Contact API endpoints.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use crm_store::{ContactFilter, CrmStore};
use entities::{Contact, CreateContactInput, UpdateContactInput, is_valid_contact_name};
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

/// Loads a contact and checks that `user` owns it.
pub(crate) async fn owned_contact<S: CrmStore>(
    state: &AppState<S>,
    user: &AuthenticatedUser,
    id: &str,
) -> ServerResult<Contact> {
    let contact = state
        .store
        .get_contact(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Contact not found".to_string()))?;

    if contact.user_id != Some(user.id) {
        return Err(ServerError::Forbidden);
    }
    Ok(contact)
}

/// Lists the caller's contacts in creation order.
pub async fn list_contacts<S: CrmStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ServerResult<Json<Vec<Contact>>> {
    let contacts = state
        .store
        .list_contacts(ContactFilter {
            user_id: Some(user.id),
        })
        .await?;

    Ok(Json(contacts))
}

/// Creates a contact owned by the caller.
pub async fn create_contact<S: CrmStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(input): Json<CreateContactInput>,
) -> ServerResult<(StatusCode, Json<Contact>)> {
    if !is_valid_contact_name(&input.name) {
        return Err(ServerError::InvalidRequest("Name is required".to_string()));
    }

    let contact = Contact::new(Uuid::new_v4().to_string(), input).with_owner(user.id);
    let contact = state.store.create_contact(contact).await?;

    tracing::info!(contact_id = %contact.id, user_id = %user.id, "Contact created");

    Ok((StatusCode::CREATED, Json(contact)))
}

/// Applies a partial update to one of the caller's contacts.
pub async fn update_contact<S: CrmStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(mut input): Json<UpdateContactInput>,
) -> ServerResult<Json<Contact>> {
    let mut contact = owned_contact(&state, &user, &id).await?;

    if input.name.as_deref().is_some_and(|name| !is_valid_contact_name(name)) {
        return Err(ServerError::InvalidRequest("Name cannot be empty".to_string()));
    }

    input.id = id;
    contact.apply(&input);
    let contact = state.store.update_contact(contact).await?;

    tracing::info!(contact_id = %contact.id, "Contact updated");

    Ok(Json(contact))
}

/// Deletes one of the caller's contacts and its interactions.
pub async fn delete_contact<S: CrmStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ServerResult<StatusCode> {
    owned_contact(&state, &user, &id).await?;
    state.store.delete_contact(&id).await?;

    tracing::info!(contact_id = %id, "Contact deleted");

    Ok(StatusCode::NO_CONTENT)
}
