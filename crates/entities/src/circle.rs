//! Circle entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Circles created for a user who has none yet: `(name, is_active)` in
/// display order.
pub const DEFAULT_CIRCLES: [(&str, bool); 10] = [
    ("Family", true),
    ("Friend", true),
    ("Relative", true),
    ("Work", true),
    ("Acquaintance", true),
    ("Circle 6", false),
    ("Circle 7", false),
    ("Circle 8", false),
    ("Circle 9", false),
    ("Circle 10", false),
];

/// A user-defined grouping used to tag contacts (e.g. "Family", "Work").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Circle name, unique per user.
    pub name: String,
    /// Whether the circle is shown.
    pub is_active: bool,
    /// Display position.
    pub order: i32,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Circle {
    /// Creates a new active circle at position 0.
    pub fn new(user_id: Uuid, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            is_active: true,
            order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets whether the circle is active.
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Sets the display position.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Builds the default circle set for a user.
    pub fn defaults_for(user_id: Uuid) -> Vec<Circle> {
        DEFAULT_CIRCLES
            .iter()
            .zip(0..)
            .map(|((name, is_active), order)| {
                Circle::new(user_id, *name)
                    .with_active(*is_active)
                    .with_order(order)
            })
            .collect()
    }
}

/// One entry of a batch circle upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleInput {
    /// Circle name; identifies the circle within the user's set.
    pub name: String,
    /// New active flag. Defaults to active when creating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// New display position. Defaults to 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}
