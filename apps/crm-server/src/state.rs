//! Application state.

use std::sync::Arc;

use auth::JwtManager;
use crm_store::CrmStore;

use crate::config::Config;

/// Shared application state.
pub struct AppState<S: CrmStore> {
    /// Server configuration.
    pub config: Config,
    /// Contact store.
    pub store: S,
    /// Issues and validates access tokens.
    pub jwt_manager: JwtManager,
}

impl<S: CrmStore> AppState<S> {
    /// Creates new application state.
    pub fn new(config: Config, store: S, jwt_manager: JwtManager) -> Self {
        Self {
            config,
            store,
            jwt_manager,
        }
    }
}

/// Type alias for shared state.
pub type SharedState<S> = Arc<AppState<S>>;
