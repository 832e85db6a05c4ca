use serde::{Deserialize, Serialize};

pub mod contact;
pub mod directory;
pub mod group;
pub mod import;
pub mod todo;

pub use contact::{
    initial_for, Contact, ContactsResponse, CreateContactRequest, ExistingContactRef, GeoPoint,
    NewContact, UpdateContactRequest, DEFAULT_CONTACT_TYPE,
};
pub use directory::{
    CreateDirectoryEntryRequest, DirectoryEntry, DirectoryResponse, NumberLookupResponse,
};
pub use group::{CreateGroupRequest, Group, GroupMember, GroupsResponse, UpdateGroupRequest};
pub use import::{
    BulkImportRequest, GoogleContactPreview, ImportCandidate, ImportResponse, ImportSource,
    ImportSummary, SkippedCandidate,
};
pub use todo::{CreateTodoRequest, Todo, TodoFilter, TodosResponse, UpdateTodoRequest};

/// Error response for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(rename = "existingContact", skip_serializing_if = "Option::is_none")]
    pub existing_contact: Option<ExistingContactRef>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            existing_contact: None,
        }
    }
}
