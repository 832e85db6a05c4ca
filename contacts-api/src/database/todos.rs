use chrono::NaiveDate;
use contacts_core::StoreError;
use rusqlite::{params, Connection, OptionalExtension, Row};
use shared_types::{Todo, TodoFilter};

use crate::database::contacts::{pool_unavailable, read_error, write_error};
use crate::database::AsyncDbConnection;

const TODO_COLUMNS: &str = "id, owner_id, description, due_date, is_completed, created_at";

/// Fields a todo update may touch. `due_date: Some(None)` clears the date.
#[derive(Debug, Default)]
pub struct TodoChanges {
    pub description: Option<String>,
    pub due_date: Option<Option<NaiveDate>>,
    pub is_completed: Option<bool>,
}

fn todo_from_row(row: &Row<'_>) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        description: row.get(2)?,
        due_date: row.get(3)?,
        is_completed: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn load_todo(conn: &Connection, owner_id: &str, id: i64) -> rusqlite::Result<Option<Todo>> {
    conn.query_row(
        &format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?1 AND owner_id = ?2"),
        params![id, owner_id],
        todo_from_row,
    )
    .optional()
}

/// Todos of `owner_id` ordered by due date, undated ones first. Dated filters
/// compare against `today` and never include undated todos.
pub async fn list_todos(
    conn: &AsyncDbConnection,
    owner_id: &str,
    filter: TodoFilter,
    today: NaiveDate,
) -> Result<Vec<Todo>, StoreError> {
    let conn = conn.lock().await.map_err(pool_unavailable)?;

    let condition = match filter {
        TodoFilter::All => "",
        TodoFilter::Today => "AND due_date = ?2",
        TodoFilter::Upcoming => "AND due_date >= ?2",
        TodoFilter::Past => "AND due_date < ?2",
    };
    let query = format!(
        "SELECT {TODO_COLUMNS} FROM todos
         WHERE owner_id = ?1 {condition}
         ORDER BY due_date IS NOT NULL, due_date, id"
    );

    let mut stmt = conn.prepare(&query).map_err(read_error)?;
    let rows = if filter == TodoFilter::All {
        stmt.query_map(params![owner_id], todo_from_row)
    } else {
        stmt.query_map(params![owner_id, today.to_string()], todo_from_row)
    }
    .map_err(read_error)?;

    rows.collect::<Result<Vec<_>, _>>().map_err(read_error)
}

pub async fn create_todo(
    conn: &AsyncDbConnection,
    owner_id: &str,
    description: &str,
    due_date: Option<NaiveDate>,
) -> Result<Todo, StoreError> {
    let conn = conn.lock().await.map_err(pool_unavailable)?;
    let now = chrono::Utc::now().timestamp();

    conn.query_row(
        &format!(
            "INSERT INTO todos (owner_id, description, due_date, is_completed, created_at)
             VALUES (?1, ?2, ?3, 0, ?4)
             RETURNING {TODO_COLUMNS}"
        ),
        params![owner_id, description, due_date.map(|d| d.to_string()), now],
        todo_from_row,
    )
    .map_err(write_error)
}

/// Returns `None` when the owner has no such todo.
pub async fn update_todo(
    conn: &AsyncDbConnection,
    owner_id: &str,
    id: i64,
    changes: TodoChanges,
) -> Result<Option<Todo>, StoreError> {
    let conn = conn.lock().await.map_err(pool_unavailable)?;

    let Some(mut todo) = load_todo(&conn, owner_id, id).map_err(read_error)? else {
        return Ok(None);
    };
    if let Some(description) = changes.description {
        todo.description = description;
    }
    if let Some(due_date) = changes.due_date {
        todo.due_date = due_date.map(|d| d.to_string());
    }
    if let Some(is_completed) = changes.is_completed {
        todo.is_completed = is_completed;
    }

    conn.execute(
        "UPDATE todos SET description = ?1, due_date = ?2, is_completed = ?3
         WHERE id = ?4 AND owner_id = ?5",
        params![todo.description, todo.due_date, todo.is_completed, id, owner_id],
    )
    .map_err(write_error)?;

    Ok(Some(todo))
}

pub async fn complete_todo(
    conn: &AsyncDbConnection,
    owner_id: &str,
    id: i64,
) -> Result<Option<Todo>, StoreError> {
    update_todo(
        conn,
        owner_id,
        id,
        TodoChanges {
            is_completed: Some(true),
            ..TodoChanges::default()
        },
    )
    .await
}

pub async fn delete_todo(
    conn: &AsyncDbConnection,
    owner_id: &str,
    id: i64,
) -> Result<bool, StoreError> {
    let conn = conn.lock().await.map_err(pool_unavailable)?;
    let deleted = conn
        .execute(
            "DELETE FROM todos WHERE id = ?1 AND owner_id = ?2",
            params![id, owner_id],
        )
        .map_err(write_error)?;
    Ok(deleted > 0)
}
