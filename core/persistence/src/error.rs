//! FILENAME: core/persistence/src/error.rs

use pivot_model::SchemaError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported document version: {0}")]
    UnsupportedVersion(u32),

    #[error("Invalid schema: {0}")]
    Schema(#[from] SchemaError),
}
