use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const DEFAULT_CONTACT_TYPE: &str = "personal";

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: i64,
    pub owner_id: String,
    pub name: String,
    pub phone: String,
    pub phone_normalized: String,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub initial: Option<String>,
    #[serde(rename = "type")]
    pub contact_type: String,
    pub location: Option<GeoPoint>,
    pub created_at: i64,
}

/// A contact that has been validated and normalized but not yet persisted.
/// The store assigns `id` and `created_at` on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewContact {
    pub owner_id: String,
    pub name: String,
    pub phone: String,
    pub phone_normalized: String,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub initial: Option<String>,
    pub contact_type: String,
    pub location: Option<GeoPoint>,
}

/// Name and phone of an already stored contact, returned alongside duplicate errors
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExistingContactRef {
    pub name: String,
    pub phone: String,
}

impl From<&Contact> for ExistingContactRef {
    fn from(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            phone: contact.phone.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
pub struct CreateContactRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub initial: Option<String>,
    #[serde(rename = "type")]
    pub contact_type: Option<String>,
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
pub struct UpdateContactRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    #[serde(rename = "type")]
    pub contact_type: Option<String>,
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct ContactsResponse {
    pub contacts: Vec<Contact>,
}

/// Upper-cased first non-blank character of a name, or `None` for a blank name.
pub fn initial_for(name: &str) -> Option<String> {
    name.trim_start().chars().next().map(|c| c.to_uppercase().collect())
}
