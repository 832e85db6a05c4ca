use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::contact::{Contact, GeoPoint};

/// Where a batch of import candidates came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum ImportSource {
    Google,
    Csv,
    Vcard,
    #[default]
    BulkApi,
}

impl ImportSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportSource::Google => "google",
            ImportSource::Csv => "csv",
            ImportSource::Vcard => "vcard",
            ImportSource::BulkApi => "bulk-api",
        }
    }
}

/// An unvalidated contact record pending reconciliation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImportCandidate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "phone_value")]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub initial: Option<String>,
    #[serde(default, rename = "type")]
    pub contact_type: Option<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub source: ImportSource,
}

impl ImportCandidate {
    pub fn new(name: &str, phone: &str, source: ImportSource) -> Self {
        Self {
            name: Some(name.to_string()),
            phone: Some(phone.to_string()),
            source,
            ..Default::default()
        }
    }
}

/// Accepts a phone given as a JSON string or number; anything else counts as absent.
fn phone_value<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// A candidate that was not imported, serialized as the candidate's own
/// fields plus `reason`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SkippedCandidate {
    #[serde(flatten)]
    pub candidate: ImportCandidate,
    pub reason: String,
}

/// Per-record outcomes of one reconciled batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub added_count: usize,
    pub skipped_count: usize,
    pub added: Vec<Contact>,
    pub skipped: Vec<SkippedCandidate>,
}

impl ImportSummary {
    pub fn push_added(&mut self, contact: Contact) {
        self.added.push(contact);
        self.added_count = self.added.len();
    }

    pub fn push_skipped(&mut self, candidate: ImportCandidate, reason: impl Into<String>) {
        self.skipped.push(SkippedCandidate {
            candidate,
            reason: reason.into(),
        });
        self.skipped_count = self.skipped.len();
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct ImportResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: ImportSummary,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export)]
pub struct BulkImportRequest {
    #[serde(default)]
    pub contacts: Vec<ImportCandidate>,
}

/// Unfiltered view of a Google connection, as shown before importing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GoogleContactPreview {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_accepts_numeric_phone() {
        let candidate: ImportCandidate =
            serde_json::from_str(r#"{"name": "Bob", "phone": 5559998888}"#).unwrap();
        assert_eq!(candidate.phone.as_deref(), Some("5559998888"));
        assert_eq!(candidate.source, ImportSource::BulkApi);
    }

    #[test]
    fn test_candidate_missing_fields() {
        let candidate: ImportCandidate = serde_json::from_str(r#"{"phone": null}"#).unwrap();
        assert!(candidate.name.is_none());
        assert!(candidate.phone.is_none());
    }

    #[test]
    fn test_import_response_shape() {
        let mut summary = ImportSummary::default();
        summary.push_skipped(
            ImportCandidate::new("Ann2", "555-111-2222", ImportSource::Csv),
            "phone exists",
        );

        let json = serde_json::to_value(ImportResponse {
            success: true,
            summary,
        })
        .unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["addedCount"], 0);
        assert_eq!(json["skippedCount"], 1);
        assert_eq!(json["skipped"][0]["reason"], "phone exists");
        assert_eq!(json["skipped"][0]["name"], "Ann2");
        assert_eq!(json["skipped"][0]["phone"], "555-111-2222");
        assert_eq!(json["skipped"][0]["source"], "csv");
        assert!(json["skipped"][0].get("candidate").is_none());
    }
}
