//! Personal CRM server.
//!
//! Serves the per-user contacts, circles, and interactions API. Every API
//! route except login and the health check requires a bearer token issued
//! by this server.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod state;

use std::sync::Arc;

use auth::{JwtConfig, JwtManager};
use axum::Router;
use crm_store::CrmStore;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::state::AppState;

/// Creates the application router with all routes configured.
pub fn create_app<S: CrmStore + 'static>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Creates the application state with the given configuration and store.
pub fn create_state<S: CrmStore>(config: Config, store: S) -> Arc<AppState<S>> {
    let jwt_config =
        JwtConfig::new(config.jwt_secret.clone()).with_expiration_hours(config.jwt_expiration_hours);
    let jwt_manager = JwtManager::new(jwt_config);

    Arc::new(AppState::new(config, store, jwt_manager))
}

/// Initializes tracing with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
