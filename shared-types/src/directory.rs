use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A known name for a phone number, used to identify unknown callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub id: i64,
    pub owner_id: String,
    pub phone: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
pub struct CreateDirectoryEntryRequest {
    pub phone: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct DirectoryResponse {
    pub entries: Vec<DirectoryEntry>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct NumberLookupResponse {
    pub found: bool,
    pub name: String,
    pub phone: String,
}
