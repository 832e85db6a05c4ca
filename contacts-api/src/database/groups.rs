use contacts_core::StoreError;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use shared_types::{Group, GroupMember};

use crate::database::contacts::{pool_unavailable, read_error, write_error};
use crate::database::AsyncDbConnection;

fn load_members(conn: &Connection, group_id: i64) -> rusqlite::Result<Vec<GroupMember>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.name, c.phone, c.avatar, c.initial
         FROM group_members gm
         JOIN contacts c ON c.id = gm.contact_id
         WHERE gm.group_id = ?1
         ORDER BY gm.position",
    )?;

    let members = stmt
        .query_map([group_id], |row| {
            Ok(GroupMember {
                id: row.get(0)?,
                name: row.get(1)?,
                phone: row.get(2)?,
                avatar: row.get(3)?,
                initial: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(members)
}

fn load_group(conn: &Connection, owner_id: &str, id: i64) -> rusqlite::Result<Option<Group>> {
    let group = conn
        .query_row(
            "SELECT id, owner_id, name, description, created_at
             FROM contact_groups WHERE id = ?1 AND owner_id = ?2",
            params![id, owner_id],
            |row| {
                Ok(Group {
                    id: row.get(0)?,
                    owner_id: row.get(1)?,
                    name: row.get(2)?,
                    description: row.get(3)?,
                    members: Vec::new(),
                    created_at: row.get(4)?,
                })
            },
        )
        .optional()?;

    match group {
        Some(mut group) => {
            group.members = load_members(conn, group.id)?;
            Ok(Some(group))
        }
        None => Ok(None),
    }
}

/// Replaces the member list. Ids that are not contacts of `owner_id` are ignored,
/// as are repeated ids.
fn replace_members(
    tx: &Transaction<'_>,
    owner_id: &str,
    group_id: i64,
    member_ids: &[i64],
) -> rusqlite::Result<()> {
    tx.execute("DELETE FROM group_members WHERE group_id = ?1", [group_id])?;

    let mut insert = tx.prepare(
        "INSERT OR IGNORE INTO group_members (group_id, contact_id, position)
         SELECT ?1, id, ?3 FROM contacts WHERE id = ?2 AND owner_id = ?4",
    )?;
    for (position, contact_id) in member_ids.iter().enumerate() {
        insert.execute(params![group_id, contact_id, position as i64, owner_id])?;
    }

    Ok(())
}

pub async fn list_groups(
    conn: &AsyncDbConnection,
    owner_id: &str,
) -> Result<Vec<Group>, StoreError> {
    let conn = conn.lock().await.map_err(pool_unavailable)?;

    let ids = {
        let mut stmt = conn
            .prepare(
                "SELECT id FROM contact_groups
                 WHERE owner_id = ?1
                 ORDER BY created_at DESC, id DESC",
            )
            .map_err(read_error)?;
        let ids = stmt
            .query_map([owner_id], |row| row.get::<_, i64>(0))
            .map_err(read_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_error)?;
        ids
    };

    let mut groups = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(group) = load_group(&conn, owner_id, id).map_err(read_error)? {
            groups.push(group);
        }
    }

    Ok(groups)
}

pub async fn create_group(
    conn: &AsyncDbConnection,
    owner_id: &str,
    name: &str,
    description: Option<&str>,
    member_ids: &[i64],
) -> Result<Group, StoreError> {
    let mut conn = conn.lock().await.map_err(pool_unavailable)?;
    let now = chrono::Utc::now().timestamp();

    let tx = conn.transaction().map_err(write_error)?;
    let id: i64 = tx
        .query_row(
            "INSERT INTO contact_groups (owner_id, name, description, created_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id",
            params![owner_id, name, description, now],
            |row| row.get(0),
        )
        .map_err(write_error)?;
    replace_members(&tx, owner_id, id, member_ids).map_err(write_error)?;
    tx.commit().map_err(write_error)?;

    load_group(&conn, owner_id, id)
        .map_err(read_error)?
        .ok_or_else(|| StoreError::Rejected(format!("Group {id} vanished after insert")))
}

/// Returns `None` when the owner has no such group.
pub async fn update_group(
    conn: &AsyncDbConnection,
    owner_id: &str,
    id: i64,
    name: Option<&str>,
    description: Option<&str>,
    member_ids: Option<&[i64]>,
) -> Result<Option<Group>, StoreError> {
    let mut conn = conn.lock().await.map_err(pool_unavailable)?;

    let tx = conn.transaction().map_err(write_error)?;
    let found = tx
        .execute(
            "UPDATE contact_groups
             SET name = COALESCE(?1, name), description = COALESCE(?2, description)
             WHERE id = ?3 AND owner_id = ?4",
            params![name, description, id, owner_id],
        )
        .map_err(write_error)?;
    if found == 0 {
        return Ok(None);
    }
    if let Some(member_ids) = member_ids {
        replace_members(&tx, owner_id, id, member_ids).map_err(write_error)?;
    }
    tx.commit().map_err(write_error)?;

    load_group(&conn, owner_id, id).map_err(read_error)
}

pub async fn delete_group(
    conn: &AsyncDbConnection,
    owner_id: &str,
    id: i64,
) -> Result<bool, StoreError> {
    let conn = conn.lock().await.map_err(pool_unavailable)?;
    let deleted = conn
        .execute(
            "DELETE FROM contact_groups WHERE id = ?1 AND owner_id = ?2",
            params![id, owner_id],
        )
        .map_err(write_error)?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::contacts::delete_contact;
    use crate::database::test_database;
    use contacts_core::ContactStore;
    use shared_types::NewContact;

    async fn seed(db: &crate::database::Database, owner: &str, name: &str, phone: &str) -> i64 {
        db.contact_store()
            .insert(NewContact {
                owner_id: owner.to_string(),
                name: name.to_string(),
                phone: phone.to_string(),
                phone_normalized: phone.to_string(),
                email: None,
                avatar: None,
                initial: shared_types::initial_for(name),
                contact_type: "personal".to_string(),
                location: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_group_keeps_order_and_ignores_foreign_members() {
        let (_dir, db) = test_database();
        let ann = seed(&db, "u1", "Ann", "1").await;
        let bob = seed(&db, "u1", "Bob", "2").await;
        let eve = seed(&db, "u2", "Eve", "3").await;

        let group = create_group(
            &db.async_connection,
            "u1",
            "Family",
            Some("close"),
            &[bob, eve, ann, bob, 999],
        )
        .await
        .unwrap();

        let names: Vec<_> = group.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Ann"]);
        assert_eq!(group.description.as_deref(), Some("close"));
        assert_eq!(group.members[1].initial.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn test_update_and_delete_group() {
        let (_dir, db) = test_database();
        let ann = seed(&db, "u1", "Ann", "1").await;
        let bob = seed(&db, "u1", "Bob", "2").await;
        let group = create_group(&db.async_connection, "u1", "Work", None, &[ann])
            .await
            .unwrap();

        let renamed = update_group(&db.async_connection, "u1", group.id, Some("Office"), None, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "Office");
        assert_eq!(renamed.members.len(), 1);

        let swapped = update_group(&db.async_connection, "u1", group.id, None, None, Some(&[bob]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(swapped.name, "Office");
        assert_eq!(swapped.members[0].id, bob);

        assert!(update_group(&db.async_connection, "u2", group.id, Some("x"), None, None)
            .await
            .unwrap()
            .is_none());

        assert!(!delete_group(&db.async_connection, "u2", group.id).await.unwrap());
        assert!(delete_group(&db.async_connection, "u1", group.id).await.unwrap());
        assert!(list_groups(&db.async_connection, "u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleting_contact_removes_membership() {
        let (_dir, db) = test_database();
        let ann = seed(&db, "u1", "Ann", "1").await;
        let bob = seed(&db, "u1", "Bob", "2").await;
        create_group(&db.async_connection, "u1", "Friends", None, &[ann, bob])
            .await
            .unwrap();

        delete_contact(&db.async_connection, "u1", ann).await.unwrap();

        let groups = list_groups(&db.async_connection, "u1").await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members.len(), 1);
        assert_eq!(groups[0].members[0].name, "Bob");
    }
}
