use contacts_core::{normalize_phone, StoreError};
use rusqlite::{params, OptionalExtension, Row};
use shared_types::DirectoryEntry;

use crate::database::contacts::{is_unique_violation, pool_unavailable, read_error, write_error};
use crate::database::AsyncDbConnection;

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<DirectoryEntry> {
    Ok(DirectoryEntry {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        phone: row.get(2)?,
        name: row.get(3)?,
    })
}

pub async fn list_entries(
    conn: &AsyncDbConnection,
    owner_id: &str,
) -> Result<Vec<DirectoryEntry>, StoreError> {
    let conn = conn.lock().await.map_err(pool_unavailable)?;

    let mut stmt = conn
        .prepare(
            "SELECT id, owner_id, phone, name FROM directory_entries
             WHERE owner_id = ?1
             ORDER BY created_at DESC, id DESC",
        )
        .map_err(read_error)?;

    let entries = stmt
        .query_map([owner_id], entry_from_row)
        .map_err(read_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_error)?;

    Ok(entries)
}

/// Adds a number to the owner's directory. A number whose digits are already
/// listed by the same owner is rejected with `StoreError::DuplicateKey`.
pub async fn insert_entry(
    conn: &AsyncDbConnection,
    owner_id: &str,
    phone: &str,
    name: &str,
) -> Result<DirectoryEntry, StoreError> {
    let conn = conn.lock().await.map_err(pool_unavailable)?;
    let phone_normalized = normalize_phone(phone);
    let now = chrono::Utc::now().timestamp();

    let id: i64 = conn
        .query_row(
            "INSERT INTO directory_entries (owner_id, phone, phone_normalized, name, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id",
            params![owner_id, phone, &phone_normalized, name, now],
            |row| row.get(0),
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateKey {
                    phone_normalized: phone_normalized.clone(),
                }
            } else {
                write_error(e)
            }
        })?;

    Ok(DirectoryEntry {
        id,
        owner_id: owner_id.to_string(),
        phone: phone.to_string(),
        name: name.to_string(),
    })
}

/// Looks a number up across every owner's directory, oldest entry first.
pub async fn lookup_number(
    conn: &AsyncDbConnection,
    phone: &str,
) -> Result<Option<DirectoryEntry>, StoreError> {
    let conn = conn.lock().await.map_err(pool_unavailable)?;
    let phone_normalized = normalize_phone(phone);

    conn.query_row(
        "SELECT id, owner_id, phone, name FROM directory_entries
         WHERE phone_normalized = ?1
         ORDER BY id
         LIMIT 1",
        [&phone_normalized],
        entry_from_row,
    )
    .optional()
    .map_err(read_error)
}
