//! Interaction entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A timestamped note attached to a contact (a call, a meeting, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Contact this interaction is about.
    pub contact_id: String,
    /// Short title, may be empty.
    pub title: String,
    /// Interaction notes.
    pub body: String,
    /// When the interaction happened.
    pub date: DateTime<Utc>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Interaction {
    /// Creates a new interaction dated now.
    pub fn new(user_id: Uuid, contact_id: impl Into<String>, body: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            contact_id: contact_id.into(),
            title: String::new(),
            body: body.into(),
            date: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the date.
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }
}

/// Request body for creating an interaction.
///
/// `contact_id` and `body` are required; they are optional here so that a
/// missing field can be reported as a bad request rather than a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInteractionInput {
    #[serde(default)]
    pub contact_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// Partial update of an interaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInteractionInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl Interaction {
    /// Applies the provided fields and refreshes `updated_at`.
    pub fn apply(&mut self, input: &UpdateInteractionInput) {
        if let Some(title) = &input.title {
            self.title = title.clone();
        }
        if let Some(body) = &input.body {
            self.body = body.clone();
        }
        if let Some(date) = input.date {
            self.date = date;
        }
        self.updated_at = Utc::now();
    }
}
