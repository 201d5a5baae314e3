//! User types for authentication

use serde::{Deserialize, Serialize};

/// The user a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// User ID
    pub id: String,

    /// Email address (if available)
    pub email: Option<String>,

    /// Display name (if available)
    pub name: Option<String>,
}

impl SessionUser {
    /// Creates a new session user
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            name: None,
        }
    }

    /// Sets the email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the display name, falling back to email or ID
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }

    /// Returns the stable identity used to partition per-user client state:
    /// the email when known, otherwise the ID.
    pub fn cache_identity(&self) -> &str {
        self.email
            .as_deref()
            .filter(|email| !email.is_empty())
            .unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_user_display_name() {
        let user = SessionUser::new("user-123");
        assert_eq!(user.display_name(), "user-123");

        let user_with_email = SessionUser::new("user-123").with_email("test@example.com");
        assert_eq!(user_with_email.display_name(), "test@example.com");

        let user_with_name = SessionUser::new("user-123")
            .with_email("test@example.com")
            .with_name("Test User");
        assert_eq!(user_with_name.display_name(), "Test User");
    }

    #[test]
    fn test_cache_identity_prefers_email() {
        assert_eq!(SessionUser::new("u-1").cache_identity(), "u-1");
        assert_eq!(
            SessionUser::new("u-1").with_email("a@b.c").cache_identity(),
            "a@b.c"
        );
        assert_eq!(SessionUser::new("u-1").with_email("").cache_identity(), "u-1");
    }
}
