//! FILENAME: core/persistence/src/lib.rs
//! Pivot Persistence Module
//!
//! Handles saving and loading dataset documents (schema, records, pivot
//! configuration and filter sets) as JSON files.

mod document;
mod error;

pub use document::{DatasetDocument, DOCUMENT_VERSION};
pub use error::PersistenceError;

use log::info;
use std::fs;
use std::path::Path;

/// Reads and validates a dataset document.
pub fn load_dataset(path: &Path) -> Result<DatasetDocument, PersistenceError> {
    let json = fs::read_to_string(path)?;
    let document = DatasetDocument::from_json_str(&json)?;
    info!(
        "loaded dataset {}: {} fields, {} records",
        path.display(),
        document.schema.len(),
        document.records.len()
    );
    Ok(document)
}

/// Writes a dataset document as pretty-printed JSON, replacing any existing file.
pub fn save_dataset(path: &Path, document: &DatasetDocument) -> Result<(), PersistenceError> {
    let json = document.to_json_string()?;
    fs::write(path, json)?;
    info!(
        "saved dataset {}: {} records",
        path.display(),
        document.records.len()
    );
    Ok(())
}
