//! Import reconciliation.
//!
//! Candidates are processed one at a time, in input order. Each candidate is
//! checked against the store and, if accepted, written before the next one is
//! looked at, so later candidates see earlier ones.

use shared_types::{
    initial_for, Contact, GeoPoint, ImportCandidate, ImportSource, ImportSummary, NewContact,
    DEFAULT_CONTACT_TYPE,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::phone::normalize_phone;
use crate::resolver::{find_duplicate, DuplicateResult, MatchPolicy};
use crate::store::{ContactStore, StoreError};

pub const MISSING_NAME_OR_PHONE: &str = "missing name or phone";
pub const NAME_EXISTS: &str = "name exists";

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Contact store unavailable: {0}")]
    StoreUnavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    Added(Contact),
    Skipped {
        candidate: ImportCandidate,
        reason: String,
    },
}

/// Reason reported when a candidate's phone is already taken
pub fn phone_exists_reason(source: ImportSource) -> &'static str {
    match source {
        ImportSource::Google => "Phone already exists",
        ImportSource::Csv | ImportSource::Vcard | ImportSource::BulkApi => "phone exists",
    }
}

pub struct ImportReconciler<'a, S: ContactStore + ?Sized> {
    store: &'a S,
    policy: MatchPolicy,
}

impl<'a, S: ContactStore + ?Sized> ImportReconciler<'a, S> {
    /// Reconciler that deduplicates by phone only.
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            policy: MatchPolicy::PhoneOnly,
        }
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn reconcile(
        &self,
        owner_id: &str,
        candidates: Vec<ImportCandidate>,
    ) -> Result<ImportSummary, ReconcileError> {
        let total = candidates.len();
        let mut summary = ImportSummary::default();

        for candidate in candidates {
            match self.reconcile_one(owner_id, candidate).await? {
                ImportOutcome::Added(contact) => summary.push_added(contact),
                ImportOutcome::Skipped { candidate, reason } => {
                    summary.push_skipped(candidate, reason)
                }
            }
        }

        info!(
            "Reconciled {} candidates for owner {}: {} added, {} skipped",
            total, owner_id, summary.added_count, summary.skipped_count
        );

        Ok(summary)
    }

    /// Runs a single candidate to completion. Only an unreachable store is an error.
    pub async fn reconcile_one(
        &self,
        owner_id: &str,
        candidate: ImportCandidate,
    ) -> Result<ImportOutcome, ReconcileError> {
        let (name, phone) = match required_fields(&candidate) {
            Some(fields) => fields,
            None => return Ok(skip(candidate, MISSING_NAME_OR_PHONE)),
        };
        let phone_normalized = normalize_phone(&phone);

        let duplicate = find_duplicate(
            self.store,
            owner_id,
            &phone_normalized,
            &name,
            self.policy,
        )
        .await
        .map_err(unavailable)?;

        match duplicate {
            DuplicateResult::PhoneConflict(existing) => {
                debug!(
                    "Skipping {} candidate {:?}: phone matches contact {}",
                    candidate.source.as_str(),
                    name,
                    existing.id
                );
                let reason = phone_exists_reason(candidate.source);
                return Ok(skip(candidate, reason));
            }
            DuplicateResult::NameConflict(existing) => {
                debug!(
                    "Skipping {} candidate {:?}: name matches contact {}",
                    candidate.source.as_str(),
                    name,
                    existing.id
                );
                return Ok(skip(candidate, NAME_EXISTS));
            }
            DuplicateResult::NoConflict => {}
        }

        let new_contact = build_contact(owner_id, &candidate, name, phone, phone_normalized);

        match self.store.insert(new_contact).await {
            Ok(contact) => Ok(ImportOutcome::Added(contact)),
            Err(e) if e.is_record_level() => {
                debug!("Store rejected {:?}: {}", candidate.name, e);
                Ok(skip(candidate, e.to_string()))
            }
            Err(e) => Err(unavailable(e)),
        }
    }
}

fn required_fields(candidate: &ImportCandidate) -> Option<(String, String)> {
    let name = candidate.name.as_deref().filter(|n| !n.trim().is_empty())?;
    let phone = candidate.phone.as_deref().filter(|p| !p.trim().is_empty())?;
    Some((name.to_string(), phone.to_string()))
}

fn skip(candidate: ImportCandidate, reason: impl Into<String>) -> ImportOutcome {
    ImportOutcome::Skipped {
        candidate,
        reason: reason.into(),
    }
}

fn unavailable(e: StoreError) -> ReconcileError {
    match e {
        StoreError::Unavailable(msg) => ReconcileError::StoreUnavailable(msg),
        other => ReconcileError::StoreUnavailable(other.to_string()),
    }
}

fn build_contact(
    owner_id: &str,
    candidate: &ImportCandidate,
    name: String,
    phone: String,
    phone_normalized: String,
) -> NewContact {
    let initial = non_empty(candidate.initial.as_deref()).or_else(|| initial_for(&name));

    NewContact {
        owner_id: owner_id.to_string(),
        phone,
        phone_normalized,
        email: non_empty(candidate.email.as_deref()),
        avatar: non_empty(candidate.avatar.as_deref()),
        initial,
        contact_type: non_empty(candidate.contact_type.as_deref())
            .unwrap_or_else(|| DEFAULT_CONTACT_TYPE.to_string()),
        location: candidate.location.filter(valid_location),
        name,
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub(crate) fn valid_location(point: &GeoPoint) -> bool {
    (-90.0..=90.0).contains(&point.lat) && (-180.0..=180.0).contains(&point.lng)
}
