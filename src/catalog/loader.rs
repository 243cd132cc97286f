//! Catalog loading
//!
//! The default catalog is compiled into the binary from `assets/commands.json`.
//! Alternate catalogs are JSON arrays of records with the same shape.

use std::collections::HashSet;
use std::path::Path;

use tracing::{info, instrument};

use super::types::{Corpus, Record};
use crate::error::{CommandLibraryError, Result};

const DEFAULT_CATALOG_JSON: &str = include_str!("../../assets/commands.json");

/// Load the catalog shipped with the binary.
pub fn default_corpus() -> Result<Corpus> {
    parse_catalog(DEFAULT_CATALOG_JSON)
}

/// Parse a JSON array of records into a corpus, rejecting duplicate ids.
pub fn parse_catalog(json: &str) -> Result<Corpus> {
    let records: Vec<Record> = serde_json::from_str(json)?;
    corpus_from_records(records)
}

/// Validate records and freeze them into a corpus.
pub fn corpus_from_records(records: Vec<Record>) -> Result<Corpus> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in &records {
        if !seen.insert(record.id) {
            return Err(CommandLibraryError::DuplicateRecordId(record.id));
        }
    }
    Ok(Corpus::new(records))
}

/// Load a catalog from a JSON file on disk.
#[instrument(name = "load_catalog_file", skip_all, fields(path = %path.display()))]
pub fn load_catalog_file(path: &Path) -> Result<Corpus> {
    let json = std::fs::read_to_string(path).map_err(|source| CommandLibraryError::CatalogIo {
        path: path.to_path_buf(),
        source,
    })?;
    let corpus = parse_catalog(&json)?;
    info!(records = corpus.len(), "Loaded catalog");
    Ok(corpus)
}
