//! Per-user cache of server responses.
//!
//! The cache is a disposable projection of server state. Entries are never
//! patched in place: writes invalidate them and the next read refetches.
//!
//! Every entry carries a generation. A fetch records the generation it
//! started under and its result is only stored if the entry has not been
//! invalidated or evicted in the meantime, so a response that arrives after
//! an invalidation or an identity switch is dropped instead of applied.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use entities::Contact;
use tracing::debug;

/// Namespace of the contacts list query.
pub const CONTACTS_NAMESPACE: &str = "contacts";

/// Identifies one cached query for one user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: &'static str,
    identity: String,
}

impl CacheKey {
    /// Key of `identity`'s contacts list.
    pub fn contacts(identity: impl Into<String>) -> Self {
        Self {
            namespace: CONTACTS_NAMESPACE,
            identity: identity.into(),
        }
    }

    /// Returns the query namespace.
    pub fn namespace(&self) -> &str {
        self.namespace
    }

    /// Returns the user identity the key is bound to.
    pub fn identity(&self) -> &str {
        &self.identity
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/user/{}", self.namespace, self.identity)
    }
}

/// Proof that a fetch was started, used to store its result.
#[derive(Debug)]
pub struct FetchTicket {
    key: CacheKey,
    generation: u64,
}

#[derive(Debug)]
struct CacheEntry {
    data: Option<Vec<Contact>>,
    generation: u64,
}

/// Cache of contact lists keyed by [`CacheKey`].
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    // Cache-wide so a recreated entry never reuses an evicted one's generation.
    generations: AtomicU64,
}

impl QueryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached list for `key` if it is valid.
    pub fn get(&self, key: &CacheKey) -> Option<Vec<Contact>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).and_then(|entry| entry.data.clone())
    }

    /// Records the start of a fetch for `key`.
    pub fn begin_fetch(&self, key: &CacheKey) -> FetchTicket {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.entry(key.clone()).or_insert_with(|| CacheEntry {
            data: None,
            generation: self.next_generation(),
        });
        FetchTicket {
            key: key.clone(),
            generation: entry.generation,
        }
    }

    /// Stores the result of the fetch `ticket` was issued for.
    ///
    /// Returns false, storing nothing, if the entry was invalidated or evicted
    /// after the fetch started.
    pub fn fulfil(&self, ticket: FetchTicket, data: Vec<Contact>) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get_mut(&ticket.key) {
            Some(entry) if entry.generation == ticket.generation => {
                entry.data = Some(data);
                true
            }
            _ => {
                debug!(key = %ticket.key, "Discarding superseded response");
                false
            }
        }
    }

    /// Marks `key` stale so the next read refetches.
    pub fn invalidate(&self, key: &CacheKey) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = entries.get_mut(key) {
            entry.data = None;
            entry.generation = self.next_generation();
            debug!(key = %key, generation = entry.generation, "Invalidated");
        }
    }

    /// Drops everything cached for `key`, including in-flight fetches.
    pub fn evict(&self, key: &CacheKey) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(key).is_some() {
            debug!(key = %key, "Evicted");
        }
    }

    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns true if `key` holds valid data.
    pub fn contains(&self, key: &CacheKey) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).is_some_and(|entry| entry.data.is_some())
    }
}
