//! The persistence boundary the reconciliation core works against.
//!
//! The store is the single source of truth for the per-owner uniqueness of
//! normalized phones. Lookups made by the core are advisory; a rejected
//! insert is the authoritative answer.

use async_trait::async_trait;
use shared_types::{Contact, NewContact};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Another contact of the same owner already holds this normalized phone
    #[error("duplicate key: phone {phone_normalized} already exists for this owner")]
    DuplicateKey { phone_normalized: String },

    /// The store refused this particular record
    #[error("{0}")]
    Rejected(String),

    /// The store could not be reached at all
    #[error("contact store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// True when the failure concerns only the record being written, not the store itself.
    pub fn is_record_level(&self) -> bool {
        !matches!(self, StoreError::Unavailable(_))
    }
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn find_by_normalized_phone(
        &self,
        owner_id: &str,
        phone_normalized: &str,
    ) -> Result<Option<Contact>, StoreError>;

    /// Case-insensitive exact name match. Only letter case is folded; whitespace is significant.
    async fn find_by_name_ci(&self, owner_id: &str, name: &str)
        -> Result<Option<Contact>, StoreError>;

    async fn insert(&self, contact: NewContact) -> Result<Contact, StoreError>;
}

/// In-process store with the same uniqueness rules as the database backend.
pub struct MemoryContactStore {
    contacts: Mutex<Vec<Contact>>,
    next_id: AtomicI64,
    unavailable: AtomicBool,
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self {
            contacts: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent call fail with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn contacts(&self) -> Vec<Contact> {
        self.lock().map(|contacts| contacts.to_vec()).unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Contact>>, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".to_string()));
        }
        self.contacts
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".to_string()))
    }
}

impl Default for MemoryContactStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn find_by_normalized_phone(
        &self,
        owner_id: &str,
        phone_normalized: &str,
    ) -> Result<Option<Contact>, StoreError> {
        let contacts = self.lock()?;
        Ok(contacts
            .iter()
            .find(|c| c.owner_id == owner_id && c.phone_normalized == phone_normalized)
            .cloned())
    }

    async fn find_by_name_ci(
        &self,
        owner_id: &str,
        name: &str,
    ) -> Result<Option<Contact>, StoreError> {
        let folded = name.to_lowercase();
        let contacts = self.lock()?;
        Ok(contacts
            .iter()
            .find(|c| c.owner_id == owner_id && c.name.to_lowercase() == folded)
            .cloned())
    }

    async fn insert(&self, contact: NewContact) -> Result<Contact, StoreError> {
        let mut contacts = self.lock()?;

        if contacts.iter().any(|c| {
            c.owner_id == contact.owner_id && c.phone_normalized == contact.phone_normalized
        }) {
            return Err(StoreError::DuplicateKey {
                phone_normalized: contact.phone_normalized,
            });
        }

        let stored = Contact {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            owner_id: contact.owner_id,
            name: contact.name,
            phone: contact.phone,
            phone_normalized: contact.phone_normalized,
            email: contact.email,
            avatar: contact.avatar,
            initial: contact.initial,
            contact_type: contact.contact_type,
            location: contact.location,
            created_at: chrono::Utc::now().timestamp(),
        };
        contacts.push(stored.clone());

        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_contact(owner: &str, name: &str, key: &str) -> NewContact {
        NewContact {
            owner_id: owner.to_string(),
            name: name.to_string(),
            phone: key.to_string(),
            phone_normalized: key.to_string(),
            email: None,
            avatar: None,
            initial: None,
            contact_type: "personal".to_string(),
            location: None,
        }
    }

    #[tokio::test]
    async fn test_unique_phone_per_owner() {
        let store = MemoryContactStore::new();
        store.insert(new_contact("u1", "Ann", "5551112222")).await.unwrap();

        let err = store
            .insert(new_contact("u1", "Other", "5551112222"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
        assert!(err.is_record_level());

        // Same key under another owner is fine
        store.insert(new_contact("u2", "Ann", "5551112222")).await.unwrap();
        assert_eq!(store.contacts().len(), 2);
    }

    #[tokio::test]
    async fn test_name_lookup_folds_case_only() {
        let store = MemoryContactStore::new();
        store.insert(new_contact("u1", "Ann Lee", "1")).await.unwrap();

        assert!(store.find_by_name_ci("u1", "ANN LEE").await.unwrap().is_some());
        assert!(store.find_by_name_ci("u1", "Ann  Lee").await.unwrap().is_none());
        assert!(store.find_by_name_ci("u2", "ann lee").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unavailable() {
        let store = MemoryContactStore::new();
        store.set_unavailable(true);
        let err = store.find_by_normalized_phone("u1", "1").await.unwrap_err();
        assert!(!err.is_record_level());
    }
}
