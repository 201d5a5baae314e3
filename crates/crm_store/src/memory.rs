//! In-memory store implementation.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use entities::{Circle, Contact, Interaction, User};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::{ContactFilter, CrmStore, CrmStoreError, CrmStoreResult, InteractionFilter};

/// In-memory store, used by the server binary and by tests.
#[derive(Debug, Default)]
pub struct MemoryCrmStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    // Contacts keyed by id, with the sequence number they were created under.
    contacts: Arc<RwLock<HashMap<String, (u64, Contact)>>>,
    contact_seq: AtomicU64,
    circles: Arc<RwLock<HashMap<Uuid, Circle>>>,
    interactions: Arc<RwLock<HashMap<Uuid, Interaction>>>,
}

impl MemoryCrmStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CrmStore for MemoryCrmStore {
    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: User) -> CrmStoreResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) || users.values().any(|u| u.email == user.email) {
            return Err(CrmStoreError::already_exists("User", user.email.clone()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> CrmStoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> CrmStoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    // =========================================================================
    // Contact operations
    // =========================================================================

    async fn create_contact(&self, contact: Contact) -> CrmStoreResult<Contact> {
        let mut contacts = self.contacts.write().await;
        if contacts.contains_key(&contact.id) {
            return Err(CrmStoreError::already_exists("Contact", contact.id.clone()));
        }
        let seq = self.contact_seq.fetch_add(1, Ordering::Relaxed);
        contacts.insert(contact.id.clone(), (seq, contact.clone()));
        Ok(contact)
    }

    async fn get_contact(&self, id: &str) -> CrmStoreResult<Option<Contact>> {
        let contacts = self.contacts.read().await;
        Ok(contacts.get(id).map(|(_, c)| c.clone()))
    }

    async fn list_contacts(&self, filter: ContactFilter) -> CrmStoreResult<Vec<Contact>> {
        let contacts = self.contacts.read().await;
        let mut result: Vec<&(u64, Contact)> = contacts
            .values()
            .filter(|(_, c)| {
                if let Some(user_id) = filter.user_id {
                    c.user_id == Some(user_id)
                } else {
                    true
                }
            })
            .collect();

        result.sort_by_key(|(seq, _)| *seq);

        Ok(result.into_iter().map(|(_, c)| c.clone()).collect())
    }

    async fn update_contact(&self, contact: Contact) -> CrmStoreResult<Contact> {
        let mut contacts = self.contacts.write().await;
        let Some((_, stored)) = contacts.get_mut(&contact.id) else {
            return Err(CrmStoreError::not_found("Contact", contact.id.clone()));
        };
        *stored = contact.clone();
        Ok(contact)
    }

    async fn delete_contact(&self, id: &str) -> CrmStoreResult<()> {
        let mut contacts = self.contacts.write().await;
        if contacts.remove(id).is_none() {
            return Err(CrmStoreError::not_found("Contact", id));
        }
        drop(contacts);

        let mut interactions = self.interactions.write().await;
        let before = interactions.len();
        interactions.retain(|_, i| i.contact_id != id);
        debug!(
            contact_id = %id,
            removed_interactions = before - interactions.len(),
            "Contact deleted"
        );
        Ok(())
    }

    // =========================================================================
    // Circle operations
    // =========================================================================

    async fn create_circle(&self, circle: Circle) -> CrmStoreResult<Circle> {
        let mut circles = self.circles.write().await;
        let duplicate = circles.contains_key(&circle.id)
            || circles
                .values()
                .any(|c| c.user_id == circle.user_id && c.name == circle.name);
        if duplicate {
            return Err(CrmStoreError::already_exists("Circle", circle.name.clone()));
        }
        circles.insert(circle.id, circle.clone());
        Ok(circle)
    }

    async fn get_circle_by_name(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> CrmStoreResult<Option<Circle>> {
        let circles = self.circles.read().await;
        Ok(circles
            .values()
            .find(|c| c.user_id == user_id && c.name == name)
            .cloned())
    }

    async fn list_circles(&self, user_id: Uuid) -> CrmStoreResult<Vec<Circle>> {
        let circles = self.circles.read().await;
        let mut result: Vec<Circle> = circles
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();

        result.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));

        Ok(result)
    }

    async fn update_circle(&self, circle: Circle) -> CrmStoreResult<Circle> {
        let mut circles = self.circles.write().await;
        if !circles.contains_key(&circle.id) {
            return Err(CrmStoreError::not_found("Circle", circle.id.to_string()));
        }
        circles.insert(circle.id, circle.clone());
        Ok(circle)
    }

    // =========================================================================
    // Interaction operations
    // =========================================================================

    async fn create_interaction(&self, interaction: Interaction) -> CrmStoreResult<Interaction> {
        let mut interactions = self.interactions.write().await;
        if interactions.contains_key(&interaction.id) {
            return Err(CrmStoreError::already_exists(
                "Interaction",
                interaction.id.to_string(),
            ));
        }
        interactions.insert(interaction.id, interaction.clone());
        Ok(interaction)
    }

    async fn get_interaction(&self, id: Uuid) -> CrmStoreResult<Option<Interaction>> {
        let interactions = self.interactions.read().await;
        Ok(interactions.get(&id).cloned())
    }

    async fn list_interactions(
        &self,
        filter: InteractionFilter,
    ) -> CrmStoreResult<Vec<Interaction>> {
        let interactions = self.interactions.read().await;
        let mut result: Vec<Interaction> = interactions
            .values()
            .filter(|i| {
                let mut matches = true;
                if let Some(user_id) = filter.user_id {
                    matches = matches && i.user_id == user_id;
                }
                if let Some(contact_id) = &filter.contact_id {
                    matches = matches && &i.contact_id == contact_id;
                }
                matches
            })
            .cloned()
            .collect();

        result.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(result)
    }

    async fn update_interaction(&self, interaction: Interaction) -> CrmStoreResult<Interaction> {
        let mut interactions = self.interactions.write().await;
        if !interactions.contains_key(&interaction.id) {
            return Err(CrmStoreError::not_found(
                "Interaction",
                interaction.id.to_string(),
            ));
        }
        interactions.insert(interaction.id, interaction.clone());
        Ok(interaction)
    }

    async fn delete_interaction(&self, id: Uuid) -> CrmStoreResult<()> {
        let mut interactions = self.interactions.write().await;
        if interactions.remove(&id).is_none() {
            return Err(CrmStoreError::not_found("Interaction", id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use entities::CreateContactInput;

    use super::*;

    fn contact_for(user_id: Uuid, name: &str) -> Contact {
        Contact::new(Uuid::new_v4().to_string(), CreateContactInput::new(name)).with_owner(user_id)
    }

    #[tokio::test]
    async fn test_user_email_is_unique() {
        let store = MemoryCrmStore::new();

        store.create_user(User::new("ada@example.com")).await.unwrap();
        let result = store.create_user(User::new("ada@example.com")).await;
        assert!(matches!(result, Err(CrmStoreError::AlreadyExists { .. })));

        let fetched = store.get_user_by_email("ada@example.com").await.unwrap();
        assert!(fetched.is_some());
    }

    #[tokio::test]
    async fn test_contact_crud() {
        let store = MemoryCrmStore::new();
        let user_id = Uuid::new_v4();

        // Create
        let created = store
            .create_contact(contact_for(user_id, "Sarah Chen"))
            .await
            .unwrap();

        // Get
        let mut fetched = store.get_contact(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Sarah Chen");

        // Update
        fetched.company = Some("TechCorp Inc".to_string());
        store.update_contact(fetched).await.unwrap();
        let fetched = store.get_contact(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.company.as_deref(), Some("TechCorp Inc"));

        // Delete
        store.delete_contact(&created.id).await.unwrap();
        assert!(store.get_contact(&created.id).await.unwrap().is_none());

        let result = store.delete_contact(&created.id).await;
        assert!(matches!(result, Err(CrmStoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_contacts_by_owner_in_creation_order() {
        let store = MemoryCrmStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        for name in ["First", "Second", "Third"] {
            store.create_contact(contact_for(alice, name)).await.unwrap();
        }
        store.create_contact(contact_for(bob, "Other")).await.unwrap();

        let filter = ContactFilter {
            user_id: Some(alice),
        };
        let names: Vec<String> = store
            .list_contacts(filter)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_same_timestamp_contacts_keep_creation_order() {
        let store = MemoryCrmStore::new();
        let user_id = Uuid::new_v4();
        let created_at = Utc::now();

        for id in ["z", "a", "m"] {
            let mut contact = Contact::new(id, CreateContactInput::new(id)).with_owner(user_id);
            contact.created_at = created_at;
            store.create_contact(contact).await.unwrap();
        }

        // Updating must not move a contact.
        let mut first = store.get_contact("z").await.unwrap().unwrap();
        first.notes = Some("edited".to_string());
        store.update_contact(first).await.unwrap();

        let ids: Vec<String> = store
            .list_contacts(ContactFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }

    #[tokio::test]
    async fn test_deleting_contact_removes_its_interactions() {
        let store = MemoryCrmStore::new();
        let user_id = Uuid::new_v4();
        let keep = store.create_contact(contact_for(user_id, "Keep")).await.unwrap();
        let gone = store.create_contact(contact_for(user_id, "Gone")).await.unwrap();

        store
            .create_interaction(Interaction::new(user_id, keep.id.clone(), "Lunch"))
            .await
            .unwrap();
        store
            .create_interaction(Interaction::new(user_id, gone.id.clone(), "Call"))
            .await
            .unwrap();

        store.delete_contact(&gone.id).await.unwrap();

        let remaining = store
            .list_interactions(InteractionFilter::default())
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].contact_id, keep.id);
    }

    #[tokio::test]
    async fn test_interactions_newest_first() {
        let store = MemoryCrmStore::new();
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        store
            .create_interaction(
                Interaction::new(user_id, "c-1", "Older").with_date(now - Duration::days(2)),
            )
            .await
            .unwrap();
        store
            .create_interaction(Interaction::new(user_id, "c-1", "Newer").with_date(now))
            .await
            .unwrap();

        let filter = InteractionFilter {
            user_id: Some(user_id),
            contact_id: Some("c-1".to_string()),
        };
        let listed = store.list_interactions(filter).await.unwrap();
        assert_eq!(listed[0].body, "Newer");
        assert_eq!(listed[1].body, "Older");
    }

    #[tokio::test]
    async fn test_circle_names_unique_per_user() {
        let store = MemoryCrmStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store.create_circle(Circle::new(alice, "Family")).await.unwrap();
        store.create_circle(Circle::new(bob, "Family")).await.unwrap();

        let result = store.create_circle(Circle::new(alice, "Family")).await;
        assert!(matches!(result, Err(CrmStoreError::AlreadyExists { .. })));

        let found = tokio_test::assert_ok!(store.get_circle_by_name(bob, "Family").await);
        assert_eq!(found.map(|c| c.user_id), Some(bob));
    }

    #[tokio::test]
    async fn test_list_circles_by_order() {
        let store = MemoryCrmStore::new();
        let user_id = Uuid::new_v4();

        store
            .create_circle(Circle::new(user_id, "Work").with_order(3))
            .await
            .unwrap();
        store
            .create_circle(Circle::new(user_id, "Family").with_order(0))
            .await
            .unwrap();

        let circles = store.list_circles(user_id).await.unwrap();
        assert_eq!(circles[0].name, "Family");
        assert_eq!(circles[1].name, "Work");
    }
}
