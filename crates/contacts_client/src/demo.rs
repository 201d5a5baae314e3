//! Local demo store.
//!
//! Keeps signed-out users' contacts in [`LocalStorage`] under a single fixed
//! key. The store seeds itself with [`demo_contacts`] the first time it is
//! used against storage that holds no usable value.
//!
//! Persistence failures (for example a full quota) are logged and do not
//! roll back the in-memory list. Until the next successful write, memory and
//! storage disagree; [`DemoStore::is_synced`] reports this and
//! [`DemoStore::flush`] retries the write.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use entities::{Contact, CreateContactInput, UpdateContactInput, is_valid_contact_name};
use tracing::{debug, error, info, warn};

use crate::{ContactsError, ContactsResult, LocalStorage, StorageError, demo_contacts};

/// Storage key holding the serialized demo contacts.
pub const DEMO_STORAGE_KEY: &str = "demo_contacts";

/// Prefix of every demo contact id. Server-issued ids never carry it.
pub const DEMO_ID_PREFIX: &str = "demo-";

/// Returns true if `id` belongs to the demo store.
pub fn is_demo_id(id: &str) -> bool {
    id.starts_with(DEMO_ID_PREFIX)
}

#[derive(Debug, Default)]
struct DemoState {
    contacts: Vec<Contact>,
    loaded: bool,
    synced: bool,
}

/// Contacts store for signed-out users.
pub struct DemoStore {
    storage: Arc<dyn LocalStorage>,
    state: Mutex<DemoState>,
}

impl std::fmt::Debug for DemoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl DemoStore {
    /// Creates a store over `storage`. Nothing is read until first use.
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self {
            storage,
            state: Mutex::new(DemoState::default()),
        }
    }

    /// Returns all demo contacts in insertion order.
    pub fn list(&self) -> Vec<Contact> {
        self.state().contacts.clone()
    }

    /// Adds a contact and returns it.
    pub fn add(&self, input: CreateContactInput) -> ContactsResult<Contact> {
        if !is_valid_contact_name(&input.name) {
            return Err(ContactsError::Validation("name is required".to_string()));
        }

        let mut state = self.state();
        let contact = Contact::new(next_demo_id(&state.contacts), input);
        state.contacts.push(contact.clone());
        self.persist(&mut state);

        debug!(contact_id = %contact.id, "Demo contact added");
        Ok(contact)
    }

    /// Merges `input` over the matching contact.
    ///
    /// Returns `Ok(None)` without touching anything when no contact has that
    /// id.
    pub fn update(&self, input: UpdateContactInput) -> ContactsResult<Option<Contact>> {
        if let Some(name) = &input.name {
            if !is_valid_contact_name(name) {
                return Err(ContactsError::Validation("name cannot be empty".to_string()));
            }
        }

        let mut state = self.state();
        let Some(contact) = state.contacts.iter_mut().find(|c| c.id == input.id) else {
            debug!(contact_id = %input.id, "Demo contact not found, update ignored");
            return Ok(None);
        };
        contact.apply(&input);
        let updated = contact.clone();
        self.persist(&mut state);

        Ok(Some(updated))
    }

    /// Removes the contact with `id`. Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> bool {
        let mut state = self.state();
        let before = state.contacts.len();
        state.contacts.retain(|c| c.id != id);
        let removed = state.contacts.len() != before;
        if removed {
            self.persist(&mut state);
        }

        debug!(contact_id = %id, removed, "Demo contact deleted");
        removed
    }

    /// Removes all demo data, in memory and in storage.
    ///
    /// The store stays loaded: later calls see an empty list rather than a
    /// fresh seed.
    pub fn clear(&self) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        state.contacts.clear();
        state.loaded = true;

        match self.storage.remove_item(DEMO_STORAGE_KEY) {
            Ok(()) => {
                state.synced = true;
                info!("Demo data cleared");
            }
            Err(e) => {
                state.synced = false;
                error!(error = %e, "Failed to clear demo data");
            }
        }
    }

    /// Returns false while the last write to storage failed.
    pub fn is_synced(&self) -> bool {
        self.state().synced
    }

    /// Writes the in-memory list to storage, reporting any failure.
    pub fn flush(&self) -> ContactsResult<()> {
        let mut state = self.state();
        let result = self.write(&state.contacts);
        state.synced = result.is_ok();
        result.map_err(ContactsError::from)
    }

    /// Locks the state, loading it from storage on first use.
    fn state(&self) -> MutexGuard<'_, DemoState> {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !state.loaded {
            self.load(&mut state);
        }
        state
    }

    fn load(&self, state: &mut DemoState) {
        state.loaded = true;

        let stored = match self.storage.get_item(DEMO_STORAGE_KEY) {
            Ok(stored) => stored,
            Err(e) => {
                error!(error = %e, "Failed to load demo data");
                None
            }
        };

        if let Some(raw) = stored {
            match serde_json::from_str::<Vec<Contact>>(&raw) {
                Ok(contacts) => {
                    debug!(count = contacts.len(), "Loaded demo contacts");
                    state.contacts = contacts;
                    state.synced = true;
                    return;
                }
                Err(e) => warn!(error = %e, "Stored demo data is unreadable, reseeding"),
            }
        }

        state.contacts = demo_contacts();
        self.persist(state);
        info!(count = state.contacts.len(), "Seeded demo contacts");
    }

    fn persist(&self, state: &mut DemoState) {
        match self.write(&state.contacts) {
            Ok(()) => state.synced = true,
            Err(e) => {
                state.synced = false;
                error!(error = %e, "Failed to save demo data");
            }
        }
    }

    fn write(&self, contacts: &[Contact]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(contacts)?;
        self.storage.set_item(DEMO_STORAGE_KEY, &raw)
    }
}

/// Time-based id, bumped until it is unused.
fn next_demo_id(existing: &[Contact]) -> String {
    let mut stamp = Utc::now().timestamp_millis();
    loop {
        let id = format!("{DEMO_ID_PREFIX}{stamp}");
        if !existing.iter().any(|c| c.id == id) {
            return id;
        }
        stamp += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;
    use crate::MemoryStorage;

    fn new_store() -> (Arc<MemoryStorage>, DemoStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = DemoStore::new(storage.clone());
        (storage, store)
    }

    fn stored_contacts(storage: &MemoryStorage) -> Vec<Contact> {
        let raw = storage.get_item(DEMO_STORAGE_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    fn ids(contacts: &[Contact]) -> HashSet<String> {
        contacts.iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn test_fresh_storage_seed_scenario() {
        let (_, store) = new_store();

        let seed = store.list();
        let names: Vec<&str> = seed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Sarah Chen", "James Wilson", "Maria Garcia"]);

        let added = store.add(CreateContactInput::new("Test")).unwrap();
        let listed = store.list();
        assert_eq!(listed.len(), 4);
        assert_eq!(listed[3].name, "Test");

        assert!(store.delete(&added.id));
        let listed = store.list();
        assert_eq!(listed.len(), 3);
        assert_eq!(ids(&listed), ids(&seed));
    }

    #[test]
    fn test_seed_is_persisted_immediately() {
        let (storage, store) = new_store();
        assert!(storage.get_item(DEMO_STORAGE_KEY).unwrap().is_none());

        let seed = store.list();
        assert_eq!(stored_contacts(&storage), seed);
        assert!(store.is_synced());
    }

    #[test]
    fn test_seeding_is_idempotent() {
        let (storage, store) = new_store();

        let first = store.list();
        let second = store.list();
        let third = store.list();

        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(first.len(), 3);
        assert_eq!(stored_contacts(&storage).len(), 3);

        // A second store over the same storage loads rather than reseeds.
        let reopened = DemoStore::new(storage.clone());
        assert_eq!(reopened.list(), first);
    }

    #[test]
    fn test_unreadable_value_is_reseeded_and_persisted() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(DEMO_STORAGE_KEY, "{not json").unwrap();

        let store = DemoStore::new(storage.clone());
        assert_eq!(store.list().len(), 3);
        assert_eq!(stored_contacts(&storage).len(), 3);
    }

    #[test]
    fn test_persisted_list_round_trips() {
        let (storage, store) = new_store();

        let kept = store
            .add(CreateContactInput::new("Ada").with_email("ada@example.com"))
            .unwrap();
        let dropped = store.add(CreateContactInput::new("Grace")).unwrap();
        store
            .update(UpdateContactInput::new(kept.id.clone()).with_company("Engines Ltd"))
            .unwrap();
        store
            .update(UpdateContactInput::new("demo-2").with_notes("Signed for Q2"))
            .unwrap();
        store.delete(&dropped.id);
        store.delete("demo-3");

        let in_memory = store.list();
        let reloaded = DemoStore::new(storage.clone()).list();
        assert_eq!(reloaded, in_memory);
        assert_eq!(stored_contacts(&storage), in_memory);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(String),
        Update {
            index: usize,
            name: Option<String>,
            notes: Option<String>,
        },
        Delete(usize),
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            "[ a-zA-Z]{0,12}".prop_map(Op::Add),
            (
                any::<usize>(),
                proptest::option::of("[ a-zA-Z]{0,12}"),
                proptest::option::of("[ -~]{0,20}"),
            )
                .prop_map(|(index, name, notes)| Op::Update { index, name, notes }),
            any::<usize>().prop_map(Op::Delete),
        ]
    }

    /// Picks an existing id by position, or an unknown one when empty.
    fn pick_id(store: &DemoStore, index: usize) -> String {
        let contacts = store.list();
        if contacts.is_empty() {
            return "demo-missing".to_string();
        }
        contacts[index % contacts.len()].id.clone()
    }

    proptest! {
        #[test]
        fn prop_any_sequence_round_trips(ops in proptest::collection::vec(arb_op(), 0..24)) {
            let (storage, store) = new_store();

            for op in ops {
                match op {
                    Op::Add(name) => {
                        let _ = store.add(CreateContactInput::new(name));
                    }
                    Op::Update { index, name, notes } => {
                        let mut input = UpdateContactInput::new(pick_id(&store, index));
                        input.name = name;
                        input.notes = notes;
                        let _ = store.update(input);
                    }
                    Op::Delete(index) => {
                        store.delete(&pick_id(&store, index));
                    }
                }
            }

            prop_assert!(store.is_synced());
            let reloaded = DemoStore::new(storage.clone()).list();
            prop_assert_eq!(reloaded, store.list());
        }
    }

    #[test]
    fn test_add_rejects_empty_name() {
        let (storage, store) = new_store();
        store.list();

        for name in ["", "   "] {
            let result = store.add(CreateContactInput::new(name));
            assert!(matches!(result, Err(ContactsError::Validation(_))));
        }
        assert_eq!(store.list().len(), 3);
        assert_eq!(stored_contacts(&storage).len(), 3);
    }

    #[test]
    fn test_added_contacts_get_unique_demo_ids() {
        let (_, store) = new_store();

        let added: Vec<Contact> = (0..5)
            .map(|i| store.add(CreateContactInput::new(format!("C{i}"))).unwrap())
            .collect();

        assert!(added.iter().all(|c| is_demo_id(&c.id)));
        let all = store.list();
        assert_eq!(ids(&all).len(), all.len());
        assert!(added.iter().all(|c| c.created_at == c.updated_at));
    }

    #[test]
    fn test_update_merges_fields() {
        let (_, store) = new_store();

        let before = store.list().remove(0);
        let updated = store
            .update(UpdateContactInput::new("demo-1").with_phone("+1 (555) 000-0000"))
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, before.name);
        assert_eq!(updated.email, before.email);
        assert_eq!(updated.phone.as_deref(), Some("+1 (555) 000-0000"));
        assert_eq!(updated.created_at, before.created_at);
        assert!(updated.updated_at >= before.updated_at);
        assert_eq!(store.list()[0], updated);
    }

    #[test]
    fn test_update_rejects_empty_name() {
        let (_, store) = new_store();

        let result = store.update(UpdateContactInput::new("demo-1").with_name(" "));
        assert!(matches!(result, Err(ContactsError::Validation(_))));
        assert_eq!(store.list()[0].name, "Sarah Chen");
    }

    #[test]
    fn test_missing_ids_are_no_ops() {
        let (_, store) = new_store();
        let before = store.list();

        let updated = store
            .update(UpdateContactInput::new("demo-404").with_name("Nobody"))
            .unwrap();
        assert!(updated.is_none());
        assert!(!store.delete("demo-404"));
        assert_eq!(store.list(), before);
    }

    #[test]
    fn test_clear_empties_memory_and_storage() {
        let (storage, store) = new_store();
        store.list();

        store.clear();

        assert!(store.list().is_empty());
        assert!(storage.get_item(DEMO_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_failed_persist_keeps_memory_and_reports_unsynced() {
        let storage = Arc::new(MemoryStorage::new());
        let store = DemoStore::new(storage.clone());
        let seed = store.list();

        let quota = DEMO_STORAGE_KEY.len() + serde_json::to_string(&seed).unwrap().len();
        storage.set_quota(Some(quota));

        let added = store.add(CreateContactInput::new("Overflow")).unwrap();
        assert_eq!(store.list().len(), 4);
        assert!(!store.is_synced());
        assert_eq!(stored_contacts(&storage), seed);
        assert!(matches!(
            store.flush(),
            Err(ContactsError::Persistence(StorageError::QuotaExceeded { .. }))
        ));

        storage.set_quota(None);
        store.flush().unwrap();
        assert!(store.is_synced());
        assert!(stored_contacts(&storage).iter().any(|c| c.id == added.id));
    }
}
