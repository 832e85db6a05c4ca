use shared_types::{ImportCandidate, ImportSource};
use tracing::warn;

use super::SourceError;

pub struct VcfParser;

impl VcfParser {
    pub fn new() -> Self {
        Self
    }

    /// One `vcard` candidate per card that carries a full name.
    pub fn parse_candidates(&self, content: &[u8]) -> Result<Vec<ImportCandidate>, SourceError> {
        let content_str = std::str::from_utf8(content)
            .map_err(|e| SourceError::InvalidInput(format!("vCard is not UTF-8: {}", e)))?;
        let unfolded = unfold_lines(content_str);

        let mut candidates = Vec::new();

        // Simple vCard parser - split by BEGIN:VCARD blocks
        for (index, vcard) in unfolded.split("BEGIN:VCARD").skip(1).enumerate() {
            match self.parse_vcard(vcard) {
                Some(candidate) => candidates.push(candidate),
                None => warn!("Skipping vCard {} without FN", index + 1),
            }
        }

        Ok(candidates)
    }

    fn parse_vcard(&self, vcard: &str) -> Option<ImportCandidate> {
        let mut name = None;
        let mut email = None;
        let mut phone = None;

        for line in vcard.lines() {
            let line = line.trim();
            let Some((property, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            // Handle parameters, e.g. TEL;TYPE=cell:+1234567890
            let key = property
                .split(';')
                .next()
                .unwrap_or_default()
                .to_ascii_uppercase();

            match key.as_str() {
                "FN" if name.is_none() => name = Some(value.to_string()),
                "EMAIL" if email.is_none() => email = Some(value.to_string()),
                "TEL" if phone.is_none() => {
                    phone = Some(value.trim_start_matches("tel:").to_string())
                }
                _ => {}
            }
        }

        Some(ImportCandidate {
            name: Some(name?),
            phone,
            email,
            source: ImportSource::Vcard,
            ..Default::default()
        })
    }
}

impl Default for VcfParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Joins folded continuation lines (starting with a space or tab) onto the previous line.
fn unfold_lines(content: &str) -> String {
    content
        .replace("\r\n", "\n")
        .replace("\n ", "")
        .replace("\n\t", "")
}
