//! Remote data client.
//!
//! Talks to the server contacts API on behalf of one signed-in user. Reads go
//! through the shared [`QueryCache`] under that user's key; every successful
//! write invalidates the key so the next read refetches from the server.

use std::sync::{Arc, Mutex, PoisonError};

use auth::{AuthStatus, Session};
use entities::{Contact, CreateContactInput, UpdateContactInput};
use reqwest::{Response, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{CacheKey, ContactsError, ContactsResult, QueryCache};

/// Error body returned by the server.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Identity the context currently serves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum ActiveIdentity {
    /// No status observed yet; every client may cache.
    #[default]
    Untracked,
    SignedOut,
    Signed(CacheKey),
}

/// Shared state behind every [`LiveClient`]: the HTTP client, the API base
/// URL, and the cache. Cloning shares all three.
#[derive(Debug, Clone)]
pub struct LiveContext {
    http: reqwest::Client,
    base_url: Url,
    cache: Arc<QueryCache>,
    active: Arc<Mutex<ActiveIdentity>>,
}

impl LiveContext {
    /// Creates a context for the API at `base_url`.
    pub fn new(base_url: &str) -> ContactsResult<Self> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Creates a context using an existing HTTP client.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> ContactsResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ContactsError::Configuration(format!("Invalid API URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ContactsError::Configuration(format!(
                "API URL cannot be a base: {base_url}"
            )));
        }

        Ok(Self {
            http,
            base_url,
            cache: Arc::new(QueryCache::new()),
            active: Arc::new(Mutex::new(ActiveIdentity::Untracked)),
        })
    }

    /// Returns the shared cache.
    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// Creates a client bound to `session`.
    pub fn client_for(&self, session: &Session) -> LiveClient {
        LiveClient {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            user_id: session.user.id.clone(),
            access_token: session.access_token.clone(),
            key: CacheKey::contacts(session.user.cache_identity()),
            cache: self.cache.clone(),
            active: self.active.clone(),
        }
    }

    /// Tracks the signed-in identity, evicting the previous identity's cached
    /// data when it changes or the user signs out.
    pub fn observe(&self, status: &AuthStatus) {
        let next = match status {
            AuthStatus::Undetermined => return,
            AuthStatus::Unauthenticated => ActiveIdentity::SignedOut,
            AuthStatus::Authenticated(session) => {
                ActiveIdentity::Signed(CacheKey::contacts(session.user.cache_identity()))
            }
        };

        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if *active == next {
            return;
        }
        if let ActiveIdentity::Signed(previous) = &*active {
            info!(previous = %previous, "Identity changed, evicting cached contacts");
            self.cache.evict(previous);
        }
        *active = next;
    }
}

/// Contacts API client bound to one user.
#[derive(Clone)]
pub struct LiveClient {
    http: reqwest::Client,
    base_url: Url,
    user_id: String,
    access_token: String,
    key: CacheKey,
    cache: Arc<QueryCache>,
    active: Arc<Mutex<ActiveIdentity>>,
}

impl std::fmt::Debug for LiveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveClient")
            .field("base_url", &self.base_url.as_str())
            .field("user_id", &self.user_id)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl LiveClient {
    /// Returns the id of the user this client acts for.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Returns the cache key this client reads and invalidates.
    pub fn cache_key(&self) -> &CacheKey {
        &self.key
    }

    /// Returns this user's cached list without touching the network.
    pub fn cached(&self) -> Option<Vec<Contact>> {
        self.cache.get(&self.key)
    }

    /// Returns this user's contacts, from the cache when it is valid.
    pub async fn list(&self) -> ContactsResult<Vec<Contact>> {
        if let Some(contacts) = self.cache.get(&self.key) {
            debug!(key = %self.key, "Serving contacts from cache");
            return Ok(contacts);
        }
        self.refetch().await
    }

    /// Fetches this user's contacts from the server and caches them.
    pub async fn refetch(&self) -> ContactsResult<Vec<Contact>> {
        let ticket = self.cache.begin_fetch(&self.key);

        let response = self
            .http
            .get(self.url(&["contacts"]))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| ContactsError::Network(e.to_string()))?;
        let response = ensure_success(response, |_| "Failed to fetch contacts".to_string()).await?;

        let contacts: Vec<Contact> = response
            .json()
            .await
            .map_err(|e| ContactsError::Deserialization(e.to_string()))?;

        // A client kept past an identity switch must not repopulate the cache.
        if self.is_current() {
            self.cache.fulfil(ticket, contacts.clone());
        } else {
            debug!(key = %self.key, "Identity no longer active, not caching");
        }
        debug!(key = %self.key, count = contacts.len(), "Fetched contacts");
        Ok(contacts)
    }

    /// Creates a contact on the server.
    pub async fn add(&self, input: CreateContactInput) -> ContactsResult<Contact> {
        let response = self
            .http
            .post(self.url(&["contacts"]))
            .bearer_auth(&self.access_token)
            .json(&input)
            .send()
            .await
            .map_err(|e| ContactsError::Network(e.to_string()))?;
        let response = ensure_success(response, |_| "Failed to create contact".to_string()).await?;
        let contact: Contact = response
            .json()
            .await
            .map_err(|e| ContactsError::Deserialization(e.to_string()))?;

        self.cache.invalidate(&self.key);
        info!(contact_id = %contact.id, "Contact created");
        Ok(contact)
    }

    /// Applies a partial update on the server.
    pub async fn update(&self, input: UpdateContactInput) -> ContactsResult<Contact> {
        let response = self
            .http
            .patch(self.url(&["contacts", &input.id]))
            .bearer_auth(&self.access_token)
            .json(&input)
            .send()
            .await
            .map_err(|e| ContactsError::Network(e.to_string()))?;
        let response = ensure_success(response, |status| {
            format!("Failed to update contact: {}", status.as_u16())
        })
        .await?;
        let contact: Contact = response
            .json()
            .await
            .map_err(|e| ContactsError::Deserialization(e.to_string()))?;

        self.cache.invalidate(&self.key);
        info!(contact_id = %contact.id, "Contact updated");
        Ok(contact)
    }

    /// Deletes a contact on the server.
    pub async fn delete(&self, id: &str) -> ContactsResult<()> {
        let response = self
            .http
            .delete(self.url(&["contacts", id]))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| ContactsError::Network(e.to_string()))?;
        ensure_success(response, |_| "Failed to delete contact".to_string()).await?;

        self.cache.invalidate(&self.key);
        info!(contact_id = %id, "Contact deleted");
        Ok(())
    }

    fn is_current(&self) -> bool {
        match &*self.active.lock().unwrap_or_else(PoisonError::into_inner) {
            ActiveIdentity::Untracked => true,
            ActiveIdentity::SignedOut => false,
            ActiveIdentity::Signed(key) => *key == self.key,
        }
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in LiveContext::with_client.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Passes successful responses through and turns the rest into errors,
/// preferring the server's own message over `fallback`.
async fn ensure_success(
    response: Response,
    fallback: impl FnOnce(StatusCode) -> String,
) -> ContactsResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => fallback(status),
    };
    debug!(status = %status, message = %message, "Request failed");

    if status == StatusCode::NOT_FOUND {
        Err(ContactsError::NotFound(message))
    } else {
        Err(ContactsError::Server {
            status: status.as_u16(),
            message,
        })
    }
}
