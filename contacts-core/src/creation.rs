use shared_types::{initial_for, Contact, CreateContactRequest, NewContact, DEFAULT_CONTACT_TYPE};
use thiserror::Error;

use crate::phone::normalize_phone;
use crate::reconcile::{non_empty, valid_location};
use crate::resolver::{find_duplicate, DuplicateResult, MatchPolicy};
use crate::store::{ContactStore, StoreError};

#[derive(Debug, Error)]
pub enum CreateContactError {
    #[error("{0}")]
    Validation(String),

    #[error("Phone number already exists in contacts")]
    PhoneConflict(Contact),

    #[error("Name already exists")]
    NameConflict(Contact),

    /// The insert lost a race against another writer holding the same phone
    #[error("Phone number already exists in contacts")]
    PhoneTaken,

    #[error(transparent)]
    Store(StoreError),
}

/// Validates and normalizes a creation request into a contact ready to insert.
pub fn prepare_contact(
    owner_id: &str,
    request: &CreateContactRequest,
) -> Result<NewContact, CreateContactError> {
    // Whitespace is part of the name for duplicate checks, so it is not trimmed
    let name = request
        .name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| CreateContactError::Validation("Name is required".to_string()))?;
    let phone = non_empty(request.phone.as_deref())
        .ok_or_else(|| CreateContactError::Validation("Phone is required".to_string()))?;

    if let Some(location) = &request.location {
        if !valid_location(location) {
            return Err(CreateContactError::Validation(
                "Location is out of range".to_string(),
            ));
        }
    }

    let initial = non_empty(request.initial.as_deref()).or_else(|| initial_for(&name));

    Ok(NewContact {
        owner_id: owner_id.to_string(),
        phone_normalized: normalize_phone(&phone),
        phone,
        email: non_empty(request.email.as_deref()),
        avatar: non_empty(request.avatar.as_deref()),
        initial,
        contact_type: non_empty(request.contact_type.as_deref())
            .unwrap_or_else(|| DEFAULT_CONTACT_TYPE.to_string()),
        location: request.location,
        name,
    })
}

/// Creates a single contact after checking it against the owner's existing contacts.
///
/// Unlike batch import, the default policy for this path also rejects case-insensitive
/// name matches.
pub async fn create_contact<S>(
    store: &S,
    owner_id: &str,
    request: &CreateContactRequest,
    policy: MatchPolicy,
) -> Result<Contact, CreateContactError>
where
    S: ContactStore + ?Sized,
{
    let new_contact = prepare_contact(owner_id, request)?;

    let duplicate = find_duplicate(
        store,
        owner_id,
        &new_contact.phone_normalized,
        &new_contact.name,
        policy,
    )
    .await
    .map_err(CreateContactError::Store)?;

    match duplicate {
        DuplicateResult::PhoneConflict(existing) => Err(CreateContactError::PhoneConflict(existing)),
        DuplicateResult::NameConflict(existing) => Err(CreateContactError::NameConflict(existing)),
        DuplicateResult::NoConflict => store.insert(new_contact).await.map_err(|e| match e {
            StoreError::DuplicateKey { .. } => CreateContactError::PhoneTaken,
            other => CreateContactError::Store(other),
        }),
    }
}
