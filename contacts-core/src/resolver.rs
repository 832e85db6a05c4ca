use serde::{Deserialize, Serialize};
use shared_types::Contact;

use crate::store::{ContactStore, StoreError};

/// Which identity signals count as a duplicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Only a shared normalized phone is a duplicate
    PhoneOnly,
    /// A shared normalized phone, or failing that a case-insensitive name match
    PhoneOrName,
}

impl MatchPolicy {
    pub fn checks_name(&self) -> bool {
        matches!(self, MatchPolicy::PhoneOrName)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DuplicateResult {
    PhoneConflict(Contact),
    NameConflict(Contact),
    NoConflict,
}

/// Looks for an existing contact of `owner_id` that the candidate would duplicate.
///
/// The phone check always runs first and wins over a name match.
pub async fn find_duplicate<S>(
    store: &S,
    owner_id: &str,
    phone_normalized: &str,
    name: &str,
    policy: MatchPolicy,
) -> Result<DuplicateResult, StoreError>
where
    S: ContactStore + ?Sized,
{
    if let Some(existing) = store
        .find_by_normalized_phone(owner_id, phone_normalized)
        .await?
    {
        return Ok(DuplicateResult::PhoneConflict(existing));
    }

    if policy.checks_name() {
        if let Some(existing) = store.find_by_name_ci(owner_id, name).await? {
            return Ok(DuplicateResult::NameConflict(existing));
        }
    }

    Ok(DuplicateResult::NoConflict)
}
