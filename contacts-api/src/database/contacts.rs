use async_trait::async_trait;
use contacts_core::{normalize_phone, ContactStore, StoreError};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use shared_types::{initial_for, Contact, GeoPoint, NewContact, UpdateContactRequest};
use thiserror::Error;

use crate::database::AsyncDbConnection;
use crate::helpers::geo::haversine_km;

const CONTACT_COLUMNS: &str = "id, owner_id, name, phone, phone_normalized, email, avatar, \
     initial, contact_type, latitude, longitude, created_at";

fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    let latitude: Option<f64> = row.get(9)?;
    let longitude: Option<f64> = row.get(10)?;

    Ok(Contact {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        phone: row.get(3)?,
        phone_normalized: row.get(4)?,
        email: row.get(5)?,
        avatar: row.get(6)?,
        initial: row.get(7)?,
        contact_type: row.get(8)?,
        location: latitude
            .zip(longitude)
            .map(|(lat, lng)| GeoPoint { lat, lng }),
        created_at: row.get(11)?,
    })
}

pub(crate) fn pool_unavailable(e: r2d2::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

/// Errors that mean the database itself cannot serve requests
fn is_unavailable(e: &rusqlite::Error) -> bool {
    match e {
        rusqlite::Error::SqliteFailure(err, _) => matches!(
            err.code,
            ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::CannotOpen
                | ErrorCode::SystemIoFailure
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::NotADatabase
                | ErrorCode::OutOfMemory
                | ErrorCode::DiskFull
                | ErrorCode::ReadOnly
        ),
        _ => false,
    }
}

pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

pub(crate) fn read_error(e: rusqlite::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

pub(crate) fn write_error(e: rusqlite::Error) -> StoreError {
    if is_unavailable(&e) {
        StoreError::Unavailable(e.to_string())
    } else {
        StoreError::Rejected(e.to_string())
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// SQLite-backed `ContactStore`. `UNIQUE(owner_id, phone_normalized)` is the
/// authoritative duplicate check.
#[derive(Clone)]
pub struct SqliteContactStore {
    conn: AsyncDbConnection,
}

impl SqliteContactStore {
    pub fn new(conn: AsyncDbConnection) -> Self {
        Self { conn }
    }
}

fn find_by_phone(
    conn: &Connection,
    owner_id: &str,
    phone_normalized: &str,
    exclude_id: Option<i64>,
) -> rusqlite::Result<Option<Contact>> {
    conn.query_row(
        &format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts
             WHERE owner_id = ?1 AND phone_normalized = ?2 AND id != ?3
             LIMIT 1"
        ),
        params![owner_id, phone_normalized, exclude_id.unwrap_or(-1)],
        contact_from_row,
    )
    .optional()
}

fn find_by_id(conn: &Connection, owner_id: &str, id: i64) -> rusqlite::Result<Option<Contact>> {
    conn.query_row(
        &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1 AND owner_id = ?2"),
        params![id, owner_id],
        contact_from_row,
    )
    .optional()
}

#[async_trait]
impl ContactStore for SqliteContactStore {
    async fn find_by_normalized_phone(
        &self,
        owner_id: &str,
        phone_normalized: &str,
    ) -> Result<Option<Contact>, StoreError> {
        let conn = self.conn.lock().await.map_err(pool_unavailable)?;
        find_by_phone(&conn, owner_id, phone_normalized, None).map_err(read_error)
    }

    async fn find_by_name_ci(
        &self,
        owner_id: &str,
        name: &str,
    ) -> Result<Option<Contact>, StoreError> {
        let conn = self.conn.lock().await.map_err(pool_unavailable)?;
        conn.query_row(
            &format!(
                "SELECT {CONTACT_COLUMNS} FROM contacts
                 WHERE owner_id = ?1 AND name_folded = ?2
                 ORDER BY id
                 LIMIT 1"
            ),
            params![owner_id, name.to_lowercase()],
            contact_from_row,
        )
        .optional()
        .map_err(read_error)
    }

    async fn insert(&self, contact: NewContact) -> Result<Contact, StoreError> {
        let conn = self.conn.lock().await.map_err(pool_unavailable)?;
        let now = chrono::Utc::now().timestamp();

        let id: i64 = conn
            .query_row(
                "INSERT INTO contacts
                 (owner_id, name, name_folded, phone, phone_normalized, email, avatar,
                  initial, contact_type, latitude, longitude, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                 RETURNING id",
                params![
                    &contact.owner_id,
                    &contact.name,
                    contact.name.to_lowercase(),
                    &contact.phone,
                    &contact.phone_normalized,
                    contact.email.as_ref(),
                    contact.avatar.as_ref(),
                    contact.initial.as_ref(),
                    &contact.contact_type,
                    contact.location.map(|p| p.lat),
                    contact.location.map(|p| p.lng),
                    now
                ],
                |row| row.get(0),
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicateKey {
                        phone_normalized: contact.phone_normalized.clone(),
                    }
                } else {
                    write_error(e)
                }
            })?;

        Ok(Contact {
            id,
            owner_id: contact.owner_id,
            name: contact.name,
            phone: contact.phone,
            phone_normalized: contact.phone_normalized,
            email: contact.email,
            avatar: contact.avatar,
            initial: contact.initial,
            contact_type: contact.contact_type,
            location: contact.location,
            created_at: now,
        })
    }
}

pub async fn list_contacts(
    conn: &AsyncDbConnection,
    owner_id: &str,
) -> Result<Vec<Contact>, StoreError> {
    let conn = conn.lock().await.map_err(pool_unavailable)?;

    let mut stmt = conn
        .prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts
             WHERE owner_id = ?1
             ORDER BY created_at DESC, id DESC"
        ))
        .map_err(read_error)?;

    let contacts = stmt
        .query_map([owner_id], contact_from_row)
        .map_err(read_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_error)?;

    Ok(contacts)
}

pub async fn get_contact(
    conn: &AsyncDbConnection,
    owner_id: &str,
    id: i64,
) -> Result<Option<Contact>, StoreError> {
    let conn = conn.lock().await.map_err(pool_unavailable)?;
    find_by_id(&conn, owner_id, id).map_err(read_error)
}

#[derive(Debug, Error)]
pub enum UpdateContactError {
    #[error("Contact not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Phone number already exists in contacts")]
    PhoneConflict(Contact),

    #[error("Phone number already exists in contacts")]
    PhoneTaken,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Applies the fields present in `request`. A new phone must not belong to
/// another contact of the same owner.
pub async fn update_contact(
    conn: &AsyncDbConnection,
    owner_id: &str,
    id: i64,
    request: &UpdateContactRequest,
) -> Result<Contact, UpdateContactError> {
    let conn = conn.lock().await.map_err(pool_unavailable)?;

    let existing = find_by_id(&conn, owner_id, id)
        .map_err(read_error)?
        .ok_or(UpdateContactError::NotFound)?;

    let mut updated = existing.clone();

    if let Some(name) = &request.name {
        if name.trim().is_empty() {
            return Err(UpdateContactError::Validation(
                "Name cannot be empty".to_string(),
            ));
        }
        updated.name = name.clone();
        updated.initial = initial_for(&updated.name);
    }

    if request.phone.is_some() {
        let phone = non_empty(request.phone.as_deref())
            .ok_or_else(|| UpdateContactError::Validation("Phone cannot be empty".to_string()))?;
        let phone_normalized = normalize_phone(&phone);

        if let Some(other) =
            find_by_phone(&conn, owner_id, &phone_normalized, Some(id)).map_err(read_error)?
        {
            return Err(UpdateContactError::PhoneConflict(other));
        }

        updated.phone = phone;
        updated.phone_normalized = phone_normalized;
    }

    if request.email.is_some() {
        updated.email = non_empty(request.email.as_deref());
    }
    if request.avatar.is_some() {
        updated.avatar = non_empty(request.avatar.as_deref());
    }
    if let Some(contact_type) = non_empty(request.contact_type.as_deref()) {
        updated.contact_type = contact_type;
    }
    if let Some(location) = request.location {
        if !(-90.0..=90.0).contains(&location.lat) || !(-180.0..=180.0).contains(&location.lng) {
            return Err(UpdateContactError::Validation(
                "Location is out of range".to_string(),
            ));
        }
        updated.location = Some(location);
    }

    conn.execute(
        "UPDATE contacts
         SET name = ?1, name_folded = ?2, phone = ?3, phone_normalized = ?4, email = ?5,
             avatar = ?6, initial = ?7, contact_type = ?8, latitude = ?9, longitude = ?10
         WHERE id = ?11 AND owner_id = ?12",
        params![
            &updated.name,
            updated.name.to_lowercase(),
            &updated.phone,
            &updated.phone_normalized,
            updated.email.as_ref(),
            updated.avatar.as_ref(),
            updated.initial.as_ref(),
            &updated.contact_type,
            updated.location.map(|p| p.lat),
            updated.location.map(|p| p.lng),
            id,
            owner_id
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            UpdateContactError::PhoneTaken
        } else {
            UpdateContactError::Store(write_error(e))
        }
    })?;

    Ok(updated)
}

/// Deletes the contact and, through the foreign key cascade, its group memberships.
/// Returns false when the owner has no such contact.
pub async fn delete_contact(
    conn: &AsyncDbConnection,
    owner_id: &str,
    id: i64,
) -> Result<bool, StoreError> {
    let conn = conn.lock().await.map_err(pool_unavailable)?;
    let deleted = conn
        .execute(
            "DELETE FROM contacts WHERE id = ?1 AND owner_id = ?2",
            params![id, owner_id],
        )
        .map_err(write_error)?;
    Ok(deleted > 0)
}

/// Located contacts within `radius_km` of `center`, nearest first.
pub async fn nearby_contacts(
    conn: &AsyncDbConnection,
    owner_id: &str,
    center: GeoPoint,
    radius_km: f64,
) -> Result<Vec<Contact>, StoreError> {
    let conn = conn.lock().await.map_err(pool_unavailable)?;

    let mut stmt = conn
        .prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts
             WHERE owner_id = ?1 AND latitude IS NOT NULL AND longitude IS NOT NULL"
        ))
        .map_err(read_error)?;

    let located = stmt
        .query_map([owner_id], contact_from_row)
        .map_err(read_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_error)?;

    let mut within: Vec<(f64, Contact)> = located
        .into_iter()
        .filter_map(|contact| {
            let distance = haversine_km(center, contact.location?);
            (distance <= radius_km).then_some((distance, contact))
        })
        .collect();
    within.sort_by(|a, b| a.0.total_cmp(&b.0));

    Ok(within.into_iter().map(|(_, contact)| contact).collect())
}
