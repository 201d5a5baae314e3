//! API endpoints.

pub mod auth;
pub mod circles;
pub mod contacts;
pub mod interactions;

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use crm_store::CrmStore;

use crate::middleware::auth_middleware;
use crate::state::AppState;

/// Creates the API router with all endpoints.
///
/// Everything except `/health` and the login endpoint requires a bearer token.
pub fn create_router<S: CrmStore + 'static>(state: Arc<AppState<S>>) -> Router {
    let protected = Router::new()
        // Contact endpoints
        .route(
            "/api/contacts",
            get(contacts::list_contacts::<S>).post(contacts::create_contact::<S>),
        )
        .route(
            "/api/contacts/:id",
            patch(contacts::update_contact::<S>).delete(contacts::delete_contact::<S>),
        )
        // Circle endpoints
        .route(
            "/api/circles",
            get(circles::list_circles::<S>).post(circles::upsert_circles::<S>),
        )
        .route("/api/circles/init", post(circles::init_circles::<S>))
        // Interaction endpoints
        .route(
            "/api/interactions",
            get(interactions::list_interactions::<S>)
                .post(interactions::create_interaction::<S>),
        )
        .route(
            "/api/interactions/:id",
            patch(interactions::update_interaction::<S>)
                .delete(interactions::delete_interaction::<S>),
        )
        // Auth endpoints
        .route("/api/auth/me", get(auth::get_current_user::<S>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ));

    Router::new()
        .route("/api/auth/login", post(auth::login::<S>))
        // Health check
        .route("/health", get(health_check))
        .merge(protected)
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
