use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Projection of a contact as listed inside a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GroupMember {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub avatar: Option<String>,
    pub initial: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: i64,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<GroupMember>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
pub struct CreateGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub members: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub members: Option<Vec<i64>>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct GroupsResponse {
    pub groups: Vec<Group>,
}
