//! Candidate sources.
//!
//! Each source turns already-fetched external data into an ordered list of
//! `ImportCandidate`s. None of them touch the store or the network.

pub mod csv_parser;
pub mod google;
pub mod vcf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub use self::csv_parser::{write_contacts_csv, CsvContactParser};
pub use self::google::{candidates_from_page, preview_from_page, ConnectionsPage};
pub use self::vcf::VcfParser;
