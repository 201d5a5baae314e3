//! Client-side session state.
//!
//! The session is the only input that decides where a client reads and
//! writes contacts. It starts out undetermined and is resolved by whatever
//! signs the user in (or finds that nobody is signed in).

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::SessionUser;

/// A signed-in session.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// The signed-in user.
    pub user: SessionUser,
    /// Bearer token sent with every API call.
    pub access_token: String,
}

impl Session {
    /// Creates a new session.
    pub fn new(user: SessionUser, access_token: impl Into<String>) -> Self {
        Self {
            user,
            access_token: access_token.into(),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// Authentication status as observed by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthStatus {
    /// Still resolving; nothing is known about the user yet.
    #[default]
    Undetermined,
    /// Resolved: nobody is signed in.
    Unauthenticated,
    /// Resolved: a user is signed in.
    Authenticated(Session),
}

impl AuthStatus {
    /// Returns true while the status is still being resolved.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Undetermined)
    }

    /// Returns the session if a user is signed in.
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

/// Shared, observable authentication state.
///
/// Cloning the handle shares the underlying state.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    status: Arc<watch::Sender<AuthStatus>>,
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHandle {
    /// Creates a handle in the `Undetermined` state.
    pub fn new() -> Self {
        let (status, _) = watch::channel(AuthStatus::Undetermined);
        Self {
            status: Arc::new(status),
        }
    }

    /// Creates a handle that is already resolved to `status`.
    pub fn with_status(status: AuthStatus) -> Self {
        let handle = Self::new();
        handle.resolve(status);
        handle
    }

    /// Returns the current status.
    pub fn status(&self) -> AuthStatus {
        self.status.borrow().clone()
    }

    /// Replaces the current status.
    pub fn resolve(&self, status: AuthStatus) {
        debug!(
            loading = status.is_loading(),
            authenticated = status.session().is_some(),
            "Session status resolved"
        );
        self.status.send_replace(status);
    }

    /// Marks `session` as signed in.
    pub fn sign_in(&self, session: Session) {
        info!(user = %session.user.display_name(), "Signed in");
        self.resolve(AuthStatus::Authenticated(session));
    }

    /// Marks the session as signed out.
    pub fn sign_out(&self) {
        info!("Signed out");
        self.resolve(AuthStatus::Unauthenticated);
    }

    /// Subscribes to status changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.status.subscribe()
    }
}
