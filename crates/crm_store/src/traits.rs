//! Store trait definitions.

use async_trait::async_trait;
use entities::{Circle, Contact, Interaction, User};
use uuid::Uuid;

use crate::CrmStoreResult;

/// Filter options for listing contacts.
#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    /// Filter by owning user.
    pub user_id: Option<Uuid>,
}

/// Filter options for listing interactions.
#[derive(Debug, Clone, Default)]
pub struct InteractionFilter {
    /// Filter by owning user.
    pub user_id: Option<Uuid>,
    /// Filter by contact.
    pub contact_id: Option<String>,
}

/// Trait for CRM storage operations.
#[async_trait]
pub trait CrmStore: Send + Sync {
    // =========================================================================
    // User operations
    // =========================================================================

    /// Creates a new user.
    async fn create_user(&self, user: User) -> CrmStoreResult<User>;

    /// Gets a user by ID.
    async fn get_user(&self, id: Uuid) -> CrmStoreResult<Option<User>>;

    /// Gets a user by email.
    async fn get_user_by_email(&self, email: &str) -> CrmStoreResult<Option<User>>;

    // =========================================================================
    // Contact operations
    // =========================================================================

    /// Creates a new contact.
    async fn create_contact(&self, contact: Contact) -> CrmStoreResult<Contact>;

    /// Gets a contact by ID.
    async fn get_contact(&self, id: &str) -> CrmStoreResult<Option<Contact>>;

    /// Lists contacts in creation order.
    async fn list_contacts(&self, filter: ContactFilter) -> CrmStoreResult<Vec<Contact>>;

    /// Updates a contact.
    async fn update_contact(&self, contact: Contact) -> CrmStoreResult<Contact>;

    /// Deletes a contact together with its interactions.
    async fn delete_contact(&self, id: &str) -> CrmStoreResult<()>;

    // =========================================================================
    // Circle operations
    // =========================================================================

    /// Creates a new circle. Names are unique per user.
    async fn create_circle(&self, circle: Circle) -> CrmStoreResult<Circle>;

    /// Gets a user's circle by name.
    async fn get_circle_by_name(&self, user_id: Uuid, name: &str)
        -> CrmStoreResult<Option<Circle>>;

    /// Lists a user's circles by display order.
    async fn list_circles(&self, user_id: Uuid) -> CrmStoreResult<Vec<Circle>>;

    /// Updates a circle.
    async fn update_circle(&self, circle: Circle) -> CrmStoreResult<Circle>;

    // =========================================================================
    // Interaction operations
    // =========================================================================

    /// Creates a new interaction.
    async fn create_interaction(&self, interaction: Interaction) -> CrmStoreResult<Interaction>;

    /// Gets an interaction by ID.
    async fn get_interaction(&self, id: Uuid) -> CrmStoreResult<Option<Interaction>>;

    /// Lists interactions, most recent date first.
    async fn list_interactions(
        &self,
        filter: InteractionFilter,
    ) -> CrmStoreResult<Vec<Interaction>>;

    /// Updates an interaction.
    async fn update_interaction(&self, interaction: Interaction) -> CrmStoreResult<Interaction>;

    /// Deletes an interaction.
    async fn delete_interaction(&self, id: Uuid) -> CrmStoreResult<()>;
}
