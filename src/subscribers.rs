//! Newsletter subscriber list
//!
//! A deduplicated JSON array of email addresses stored under
//! [`SUBSCRIBERS_KEY`], independent from the watchlist.

use crate::storage::{KeyValueStore, StorageError, load_collection, save_collection};
use thiserror::Error;

/// Storage key of the subscriber collection
pub const SUBSCRIBERS_KEY: &str = "cinefind_subscribers";

/// Errors that can occur while subscribing
#[derive(Debug, Error)]
pub enum SubscribeError {
    /// The address is not shaped like `local@domain.tld`
    #[error("Not a valid email address: {0}")]
    InvalidEmail(String),

    /// The updated list could not be persisted
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result of a subscribe call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscription {
    Added,
    AlreadySubscribed,
}

/// Repository over the persisted subscriber list.
#[derive(Debug)]
pub struct SubscriberList<S> {
    store: S,
}

impl<S: KeyValueStore> SubscriberList<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All subscribed addresses in subscription order
    pub fn list(&self) -> Vec<String> {
        load_collection(&self.store, SUBSCRIBERS_KEY)
    }

    /// Returns true if the (normalized) address is subscribed
    pub fn contains(&self, email: &str) -> bool {
        normalize_email(email).is_some_and(|email| self.list().contains(&email))
    }

    /// Adds an address, normalized to trimmed lowercase
    ///
    /// # Errors
    ///
    /// Returns [`SubscribeError::InvalidEmail`] for malformed addresses and
    /// [`SubscribeError::Storage`] if the list cannot be written.
    pub fn subscribe(&mut self, email: &str) -> Result<Subscription, SubscribeError> {
        let email =
            normalize_email(email).ok_or_else(|| SubscribeError::InvalidEmail(email.to_string()))?;

        let mut subscribers = self.list();
        if subscribers.contains(&email) {
            return Ok(Subscription::AlreadySubscribed);
        }

        subscribers.push(email);
        save_collection(&self.store, SUBSCRIBERS_KEY, &subscribers)?;
        Ok(Subscription::Added)
    }

    /// Removes an address; unknown addresses are a no-op
    ///
    /// # Errors
    ///
    /// Returns an error if the updated list cannot be written.
    pub fn unsubscribe(&mut self, email: &str) -> Result<bool, StorageError> {
        let Some(email) = normalize_email(email) else {
            return Ok(false);
        };

        let mut subscribers = self.list();
        let before = subscribers.len();
        subscribers.retain(|s| *s != email);
        if subscribers.len() == before {
            return Ok(false);
        }

        save_collection(&self.store, SUBSCRIBERS_KEY, &subscribers)?;
        Ok(true)
    }
}

/// Trims and lowercases an address, rejecting anything not `local@domain.tld`
fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    let (local, domain) = email.split_once('@')?;

    let well_formed = !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace);

    well_formed.then_some(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Film.Fan@Example.COM "),
            Some("film.fan@example.com".to_string())
        );
        assert_eq!(normalize_email("no-at-sign.com"), None);
        assert_eq!(normalize_email("@example.com"), None);
        assert_eq!(normalize_email("user@localhost"), None);
        assert_eq!(normalize_email("user@.com"), None);
        assert_eq!(normalize_email("user@example."), None);
        assert_eq!(normalize_email("a@b@c.com"), None);
        assert_eq!(normalize_email("two words@example.com"), None);
    }

    #[test]
    fn test_subscribe_deduplicates() {
        let mut list = SubscriberList::new(MemoryStore::new());

        assert_eq!(list.subscribe("fan@example.com").unwrap(), Subscription::Added);
        assert_eq!(
            list.subscribe(" FAN@example.com").unwrap(),
            Subscription::AlreadySubscribed
        );
        assert_eq!(list.subscribe("other@example.com").unwrap(), Subscription::Added);

        assert_eq!(list.list(), ["fan@example.com", "other@example.com"]);
        assert!(list.contains("Fan@Example.com"));
    }

    #[test]
    fn test_subscribe_rejects_invalid_address() {
        let mut list = SubscriberList::new(MemoryStore::new());

        let result = list.subscribe("not-an-email");

        assert!(matches!(result, Err(SubscribeError::InvalidEmail(_))));
        assert!(list.list().is_empty());
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let mut list = SubscriberList::new(MemoryStore::new());
        list.subscribe("fan@example.com").unwrap();

        assert!(list.unsubscribe("fan@example.com").unwrap());
        assert!(!list.unsubscribe("fan@example.com").unwrap());
        assert!(!list.unsubscribe("garbage").unwrap());
        assert!(list.list().is_empty());
    }

    #[test]
    fn test_independent_from_watchlist_key() {
        let store = MemoryStore::new();
        store.set(crate::watchlist::WATCHLIST_KEY, "[]").unwrap();
        store.set(SUBSCRIBERS_KEY, "corrupt").unwrap();
        let mut list = SubscriberList::new(&store);

        assert!(list.list().is_empty());
        list.subscribe("fan@example.com").unwrap();

        assert_eq!(store.get(crate::watchlist::WATCHLIST_KEY).unwrap().as_deref(), Some("[]"));
    }
}
