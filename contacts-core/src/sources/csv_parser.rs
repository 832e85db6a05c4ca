use csv::{ReaderBuilder, WriterBuilder};
use shared_types::{Contact, GeoPoint, ImportCandidate, ImportSource};
use std::collections::HashMap;
use tracing::warn;

use super::SourceError;

pub const EXPORT_HEADERS: [&str; 6] = ["name", "phone", "email", "type", "latitude", "longitude"];

#[derive(Debug, Default)]
pub struct CsvContactParser;

impl CsvContactParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses rows into maps keyed by lower-cased, trimmed header names.
    /// Blank lines are skipped; rows that fail to parse are logged and dropped.
    pub fn parse_to_maps(
        &self,
        content: &[u8],
    ) -> Result<Vec<HashMap<String, String>>, SourceError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| SourceError::Parse(e.to_string()))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_lowercase())
            .collect();

        let mut records = Vec::new();

        for (row, result) in reader.records().enumerate() {
            match result {
                Ok(record) => {
                    if record.iter().all(|field| field.is_empty()) {
                        continue;
                    }
                    let mut map = HashMap::new();
                    for (i, field) in record.iter().enumerate() {
                        if let Some(header) = headers.get(i) {
                            map.insert(header.clone(), field.to_string());
                        }
                    }
                    records.push(map);
                }
                Err(e) => {
                    warn!("Failed to parse CSV row {}: {}", row + 1, e);
                }
            }
        }

        Ok(records)
    }

    /// One `csv` candidate per data row, in file order.
    pub fn parse_candidates(&self, content: &[u8]) -> Result<Vec<ImportCandidate>, SourceError> {
        let records = self.parse_to_maps(content)?;
        Ok(records.iter().map(candidate_from_record).collect())
    }
}

fn candidate_from_record(record: &HashMap<String, String>) -> ImportCandidate {
    let field = |key: &str| {
        record
            .get(key)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let location = match (field("latitude"), field("longitude")) {
        (Some(lat), Some(lng)) => match (lat.parse::<f64>(), lng.parse::<f64>()) {
            (Ok(lat), Ok(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        },
        _ => None,
    };

    ImportCandidate {
        name: field("name"),
        phone: field("phone"),
        email: field("email"),
        avatar: None,
        initial: None,
        contact_type: field("type"),
        location,
        source: ImportSource::Csv,
    }
}

/// Writes contacts with the same columns the importer reads back.
pub fn write_contacts_csv(contacts: &[Contact]) -> Result<Vec<u8>, SourceError> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    writer
        .write_record(EXPORT_HEADERS)
        .map_err(|e| SourceError::Parse(e.to_string()))?;

    for contact in contacts {
        let (lat, lng) = contact
            .location
            .map(|p| (p.lat.to_string(), p.lng.to_string()))
            .unwrap_or_default();

        writer
            .write_record([
                contact.name.as_str(),
                contact.phone.as_str(),
                contact.email.as_deref().unwrap_or(""),
                contact.contact_type.as_str(),
                lat.as_str(),
                lng.as_str(),
            ])
            .map_err(|e| SourceError::Parse(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| SourceError::Parse(e.to_string()))
}
