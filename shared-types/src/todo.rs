use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Which todos a listing returns, judged by due date against the server's current day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TodoFilter {
    #[default]
    All,
    Today,
    Upcoming,
    Past,
}

impl TodoFilter {
    /// Unknown or missing values list everything.
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("today") => TodoFilter::Today,
            Some("upcoming") => TodoFilter::Upcoming,
            Some("past") => TodoFilter::Past,
            _ => TodoFilter::All,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub owner_id: String,
    pub description: String,
    /// `YYYY-MM-DD`
    pub due_date: Option<String>,
    pub is_completed: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub description: Option<String>,
    pub due_date: Option<String>,
}

/// Partial update. An empty `dueDate` clears the due date.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub is_completed: Option<bool>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct TodosResponse {
    pub todos: Vec<Todo>,
}
