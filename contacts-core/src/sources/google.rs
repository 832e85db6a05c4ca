//! Mapping of Google People API `connections.list` pages to import candidates.
//!
//! Only the fields requested with `personFields=names,emailAddresses,phoneNumbers`
//! are modelled. Fetching the page is left to the caller.

use serde::Deserialize;
use shared_types::{GoogleContactPreview, ImportCandidate, ImportSource};

pub const PERSON_FIELDS: &str = "names,emailAddresses,phoneNumbers";
pub const DEFAULT_NAME: &str = "No Name";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionsPage {
    pub connections: Vec<Person>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Person {
    pub names: Vec<PersonName>,
    pub email_addresses: Vec<FieldValue>,
    pub phone_numbers: Vec<FieldValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonName {
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FieldValue {
    pub value: Option<String>,
}

impl Person {
    fn display_name(&self) -> Option<String> {
        first_value(self.names.iter().map(|n| n.display_name.as_deref()))
    }

    fn email(&self) -> Option<String> {
        first_value(self.email_addresses.iter().map(|e| e.value.as_deref()))
    }

    fn phone(&self) -> Option<String> {
        first_value(self.phone_numbers.iter().map(|p| p.value.as_deref()))
    }
}

fn first_value<'a>(mut values: impl Iterator<Item = Option<&'a str>>) -> Option<String> {
    values
        .next()
        .flatten()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Candidates for every connection within `page_size` that has a phone number.
///
/// Only the first name, email and phone of each person are used; a person
/// without a display name is imported as "No Name".
pub fn candidates_from_page(page: &ConnectionsPage, page_size: usize) -> Vec<ImportCandidate> {
    page.connections
        .iter()
        .take(page_size)
        .filter_map(|person| {
            let phone = person.phone()?;
            Some(ImportCandidate {
                name: Some(person.display_name().unwrap_or_else(|| DEFAULT_NAME.to_string())),
                phone: Some(phone),
                email: person.email(),
                source: ImportSource::Google,
                ..Default::default()
            })
        })
        .collect()
}

/// Unfiltered preview of the first `page_size` connections.
pub fn preview_from_page(page: &ConnectionsPage, page_size: usize) -> Vec<GoogleContactPreview> {
    page.connections
        .iter()
        .take(page_size)
        .map(|person| GoogleContactPreview {
            name: person.display_name(),
            email: person.email(),
            phone: person.phone(),
        })
        .collect()
}
