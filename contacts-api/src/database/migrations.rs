use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    // Create contacts table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id VARCHAR NOT NULL,
            name VARCHAR NOT NULL,
            name_folded VARCHAR NOT NULL,
            phone VARCHAR NOT NULL,
            phone_normalized VARCHAR NOT NULL,
            email VARCHAR,
            avatar VARCHAR,
            initial VARCHAR,
            contact_type VARCHAR NOT NULL DEFAULT 'personal',
            latitude REAL,
            longitude REAL,
            created_at BIGINT NOT NULL,
            UNIQUE (owner_id, phone_normalized)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_contacts_owner_name
            ON contacts(owner_id, name_folded)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_contacts_owner_created
            ON contacts(owner_id, created_at)",
        [],
    )?;

    // Create groups tables
    conn.execute(
        "CREATE TABLE IF NOT EXISTS contact_groups (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id VARCHAR NOT NULL,
            name VARCHAR NOT NULL,
            description VARCHAR,
            created_at BIGINT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS group_members (
            group_id INTEGER NOT NULL,
            contact_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY (group_id, contact_id),
            FOREIGN KEY (group_id) REFERENCES contact_groups (id) ON DELETE CASCADE,
            FOREIGN KEY (contact_id) REFERENCES contacts (id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_contact_groups_owner
            ON contact_groups(owner_id)",
        [],
    )?;

    // Create number directory table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS directory_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id VARCHAR NOT NULL,
            phone VARCHAR NOT NULL,
            phone_normalized VARCHAR NOT NULL,
            name VARCHAR NOT NULL,
            created_at BIGINT NOT NULL,
            UNIQUE (owner_id, phone_normalized)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_directory_phone
            ON directory_entries(phone_normalized)",
        [],
    )?;

    // Create todos table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS todos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id VARCHAR NOT NULL,
            description VARCHAR NOT NULL,
            due_date VARCHAR,
            is_completed BOOLEAN NOT NULL DEFAULT 0,
            created_at BIGINT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_todos_owner_due
            ON todos(owner_id, due_date)",
        [],
    )?;

    Ok(())
}
