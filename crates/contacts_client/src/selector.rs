//! Source selection.
//!
//! [`select`] maps the current [`AuthStatus`] to one [`ContactSource`]. The
//! choice depends on nothing else, and no source ever rewrites another
//! source's errors.

use std::sync::Arc;

use async_trait::async_trait;
use auth::{AuthStatus, SessionHandle};
use entities::{Contact, CreateContactInput, UpdateContactInput};
use tracing::debug;

use crate::{ClientConfig, ContactsResult, DemoStore, FileStorage, LiveClient, LiveContext};

/// Result of listing contacts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactList {
    pub contacts: Vec<Contact>,
    /// True while the session is still resolving and nothing can be listed.
    pub is_loading: bool,
}

impl ContactList {
    fn ready(contacts: Vec<Contact>) -> Self {
        Self {
            contacts,
            is_loading: false,
        }
    }

    fn loading() -> Self {
        Self {
            contacts: Vec::new(),
            is_loading: true,
        }
    }
}

/// The contacts interface every source exposes.
#[async_trait]
pub trait ContactsApi: Send + Sync {
    /// Lists contacts.
    async fn list(&self) -> ContactsResult<ContactList>;

    /// Creates a contact. Returns `None` when the source accepted the call
    /// without storing anything.
    async fn add(&self, input: CreateContactInput) -> ContactsResult<Option<Contact>>;

    /// Applies a partial update. Returns `None` when nothing was updated.
    async fn update(&self, input: UpdateContactInput) -> ContactsResult<Option<Contact>>;

    /// Deletes a contact.
    async fn delete(&self, id: &str) -> ContactsResult<()>;

    /// Returns true if this source serves demo data.
    fn is_demo(&self) -> bool;

    /// Returns true while the session is still resolving.
    fn is_loading(&self) -> bool;
}

/// Stand-in used while the session is undetermined.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadingSource;

#[async_trait]
impl ContactsApi for LoadingSource {
    async fn list(&self) -> ContactsResult<ContactList> {
        Ok(ContactList::loading())
    }

    async fn add(&self, _input: CreateContactInput) -> ContactsResult<Option<Contact>> {
        debug!("Ignoring add while session is loading");
        Ok(None)
    }

    async fn update(&self, _input: UpdateContactInput) -> ContactsResult<Option<Contact>> {
        debug!("Ignoring update while session is loading");
        Ok(None)
    }

    async fn delete(&self, _id: &str) -> ContactsResult<()> {
        debug!("Ignoring delete while session is loading");
        Ok(())
    }

    fn is_demo(&self) -> bool {
        false
    }

    fn is_loading(&self) -> bool {
        true
    }
}

/// Async adapter over the shared [`DemoStore`].
#[derive(Debug, Clone)]
pub struct DemoSource(Arc<DemoStore>);

impl DemoSource {
    pub fn new(store: Arc<DemoStore>) -> Self {
        Self(store)
    }

    pub fn store(&self) -> &DemoStore {
        &self.0
    }
}

#[async_trait]
impl ContactsApi for DemoSource {
    async fn list(&self) -> ContactsResult<ContactList> {
        Ok(ContactList::ready(self.0.list()))
    }

    async fn add(&self, input: CreateContactInput) -> ContactsResult<Option<Contact>> {
        self.0.add(input).map(Some)
    }

    async fn update(&self, input: UpdateContactInput) -> ContactsResult<Option<Contact>> {
        self.0.update(input)
    }

    async fn delete(&self, id: &str) -> ContactsResult<()> {
        self.0.delete(id);
        Ok(())
    }

    fn is_demo(&self) -> bool {
        true
    }

    fn is_loading(&self) -> bool {
        false
    }
}

#[async_trait]
impl ContactsApi for LiveClient {
    async fn list(&self) -> ContactsResult<ContactList> {
        LiveClient::list(self).await.map(ContactList::ready)
    }

    async fn add(&self, input: CreateContactInput) -> ContactsResult<Option<Contact>> {
        LiveClient::add(self, input).await.map(Some)
    }

    async fn update(&self, input: UpdateContactInput) -> ContactsResult<Option<Contact>> {
        LiveClient::update(self, input).await.map(Some)
    }

    async fn delete(&self, id: &str) -> ContactsResult<()> {
        LiveClient::delete(self, id).await
    }

    fn is_demo(&self) -> bool {
        false
    }

    fn is_loading(&self) -> bool {
        false
    }
}

/// Which store answers, as seen from outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionState {
    Undetermined,
    Demo,
    /// Live data for the given user id.
    Live(String),
}

impl From<&AuthStatus> for SelectionState {
    fn from(status: &AuthStatus) -> Self {
        match status {
            AuthStatus::Undetermined => Self::Undetermined,
            AuthStatus::Unauthenticated => Self::Demo,
            AuthStatus::Authenticated(session) => Self::Live(session.user.id.clone()),
        }
    }
}

/// The source chosen for one authentication status.
#[derive(Debug, Clone)]
pub enum ContactSource {
    Loading(LoadingSource),
    Demo(DemoSource),
    Live(LiveClient),
}

impl ContactSource {
    /// Returns the selection this source represents.
    pub fn selection(&self) -> SelectionState {
        match self {
            Self::Loading(_) => SelectionState::Undetermined,
            Self::Demo(_) => SelectionState::Demo,
            Self::Live(client) => SelectionState::Live(client.user_id().to_string()),
        }
    }
}

#[async_trait]
impl ContactsApi for ContactSource {
    async fn list(&self) -> ContactsResult<ContactList> {
        match self {
            Self::Loading(source) => source.list().await,
            Self::Demo(source) => source.list().await,
            Self::Live(source) => ContactsApi::list(source).await,
        }
    }

    async fn add(&self, input: CreateContactInput) -> ContactsResult<Option<Contact>> {
        match self {
            Self::Loading(source) => source.add(input).await,
            Self::Demo(source) => source.add(input).await,
            Self::Live(source) => ContactsApi::add(source, input).await,
        }
    }

    async fn update(&self, input: UpdateContactInput) -> ContactsResult<Option<Contact>> {
        match self {
            Self::Loading(source) => source.update(input).await,
            Self::Demo(source) => source.update(input).await,
            Self::Live(source) => ContactsApi::update(source, input).await,
        }
    }

    async fn delete(&self, id: &str) -> ContactsResult<()> {
        match self {
            Self::Loading(source) => source.delete(id).await,
            Self::Demo(source) => source.delete(id).await,
            Self::Live(source) => ContactsApi::delete(source, id).await,
        }
    }

    fn is_demo(&self) -> bool {
        matches!(self, Self::Demo(_))
    }

    fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }
}

/// Picks the source for `status`.
pub fn select(status: &AuthStatus, demo: &Arc<DemoStore>, live: &LiveContext) -> ContactSource {
    match status {
        AuthStatus::Undetermined => ContactSource::Loading(LoadingSource),
        AuthStatus::Unauthenticated => ContactSource::Demo(DemoSource::new(demo.clone())),
        AuthStatus::Authenticated(session) => ContactSource::Live(live.client_for(session)),
    }
}

/// Entry point for views: follows the session and hands out the right source.
#[derive(Debug, Clone)]
pub struct Contacts {
    session: SessionHandle,
    demo: Arc<DemoStore>,
    live: LiveContext,
}

impl Contacts {
    pub fn new(session: SessionHandle, demo: Arc<DemoStore>, live: LiveContext) -> Self {
        Self {
            session,
            demo,
            live,
        }
    }

    /// Builds the data layer from configuration, keeping demo data on disk.
    pub fn from_config(config: &ClientConfig, session: SessionHandle) -> ContactsResult<Self> {
        let live = LiveContext::new(&config.api_base_url)?;
        let demo = Arc::new(DemoStore::new(Arc::new(FileStorage::new(
            &config.demo_storage_dir,
        ))));
        Ok(Self::new(session, demo, live))
    }

    /// Returns the source for the current session status.
    pub fn source(&self) -> ContactSource {
        let status = self.session.status();
        self.live.observe(&status);
        select(&status, &self.demo, &self.live)
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn demo(&self) -> &Arc<DemoStore> {
        &self.demo
    }

    pub fn live(&self) -> &LiveContext {
        &self.live
    }

    /// Removes all demo data, for example after the user signs in for real.
    pub fn clear_demo_data(&self) {
        self.demo.clear();
    }
}

#[cfg(test)]
mod tests {
    use auth::{Session, SessionUser};
    use entities::CreateContactInput;
    use tokio_test::assert_ok;

    use super::*;
    use crate::{ContactsError, MemoryStorage};

    fn demo_store() -> Arc<DemoStore> {
        Arc::new(DemoStore::new(Arc::new(MemoryStorage::new())))
    }

    fn live() -> LiveContext {
        LiveContext::new("http://127.0.0.1:9/api").unwrap()
    }

    fn signed_in(id: &str, email: &str) -> AuthStatus {
        AuthStatus::Authenticated(Session::new(
            SessionUser::new(id).with_email(email),
            "token",
        ))
    }

    #[test]
    fn test_select_follows_status() {
        let demo = demo_store();
        let live = live();

        let source = select(&AuthStatus::Undetermined, &demo, &live);
        assert!(source.is_loading());
        assert!(!source.is_demo());
        assert_eq!(source.selection(), SelectionState::Undetermined);

        let source = select(&AuthStatus::Unauthenticated, &demo, &live);
        assert!(source.is_demo());
        assert_eq!(source.selection(), SelectionState::Demo);

        let status = signed_in("u-1", "ada@example.com");
        let source = select(&status, &demo, &live);
        assert!(!source.is_demo());
        assert!(!source.is_loading());
        assert_eq!(source.selection(), SelectionState::Live("u-1".to_string()));
        assert_eq!(SelectionState::from(&status), source.selection());
    }

    #[tokio::test]
    async fn test_loading_source_is_inert() {
        let demo = demo_store();
        let source = select(&AuthStatus::Undetermined, &demo, &live());

        let list = assert_ok!(source.list().await);
        assert!(list.is_loading);
        assert!(list.contacts.is_empty());

        let added = assert_ok!(source.add(CreateContactInput::new("Ada")).await);
        assert!(added.is_none());
        let updated = assert_ok!(
            source
                .update(UpdateContactInput::new("demo-1").with_name("X"))
                .await
        );
        assert!(updated.is_none());
        assert_ok!(source.delete("demo-1").await);

        // Nothing reached the demo store.
        assert_eq!(demo.list()[0].name, "Sarah Chen");
        assert_eq!(demo.list().len(), 3);
    }

    #[tokio::test]
    async fn test_demo_source_routes_to_store() {
        let demo = demo_store();
        let source = select(&AuthStatus::Unauthenticated, &demo, &live());

        let list = assert_ok!(source.list().await);
        assert!(!list.is_loading);
        assert_eq!(list.contacts.len(), 3);

        let added = assert_ok!(source.add(CreateContactInput::new("Ada")).await).unwrap();
        assert!(added.id.starts_with("demo-"));
        assert_ok!(source.delete("demo-2").await);

        let names: Vec<_> = demo.list().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Sarah Chen", "Maria Garcia", "Ada"]);
    }

    #[tokio::test]
    async fn test_demo_validation_error_passes_through() {
        let source = select(&AuthStatus::Unauthenticated, &demo_store(), &live());

        let result = source.add(CreateContactInput::new("   ")).await;
        assert!(matches!(result, Err(ContactsError::Validation(_))));
    }

    #[tokio::test]
    async fn test_live_transport_error_passes_through() {
        // Nothing listens on the discard port.
        let source = select(&signed_in("u-1", "ada@example.com"), &demo_store(), &live());

        let result = source.list().await;
        assert!(matches!(result, Err(ContactsError::Network(_))));
    }

    #[test]
    fn test_facade_reselects_on_status_change() {
        let session = SessionHandle::new();
        let contacts = Contacts::new(session.clone(), demo_store(), live());

        assert!(contacts.source().is_loading());

        session.sign_out();
        assert!(contacts.source().is_demo());

        session.sign_in(Session::new(
            SessionUser::new("u-1").with_email("ada@example.com"),
            "token",
        ));
        assert_eq!(
            contacts.source().selection(),
            SelectionState::Live("u-1".to_string())
        );
    }

    #[tokio::test]
    async fn test_from_config_keeps_demo_data_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::new("http://127.0.0.1:9/api").with_demo_storage_dir(dir.path());
        let signed_out = || SessionHandle::with_status(AuthStatus::Unauthenticated);

        let contacts = assert_ok!(Contacts::from_config(&config, signed_out()));
        let source = contacts.source();
        assert!(source.is_demo());
        assert_eq!(assert_ok!(source.list().await).contacts.len(), 3);
        assert!(dir.path().join("demo_contacts.json").exists());

        let added = assert_ok!(source.add(CreateContactInput::new("Ada")).await).unwrap();

        let reopened = assert_ok!(Contacts::from_config(&config, signed_out()));
        let listed = assert_ok!(reopened.source().list().await).contacts;
        assert_eq!(listed.len(), 4);
        assert_eq!(listed[3], added);
    }

    #[test]
    fn test_from_config_rejects_bad_url() {
        let config = ClientConfig::new("not a url");
        let result = Contacts::from_config(&config, SessionHandle::new());
        assert!(matches!(result, Err(ContactsError::Configuration(_))));
    }

    #[test]
    fn test_clear_demo_data() {
        let contacts = Contacts::new(SessionHandle::new(), demo_store(), live());
        assert_eq!(contacts.demo().list().len(), 3);

        contacts.clear_demo_data();
        assert!(contacts.demo().list().is_empty());
    }
}
