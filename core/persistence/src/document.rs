//! FILENAME: core/persistence/src/document.rs
//! Dataset document - schema, records and saved pivot state in one JSON file.

use log::warn;
use pivot_engine::{compute_pivot, FilterSet, PivotConfig, PivotResult};
use pivot_model::{FieldDef, RecordEntity, Schema};
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

/// Current document format version.
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetDocument {
    pub schema: Schema,
    pub records: Vec<RecordEntity>,
    pub pivot: Option<PivotConfig>,
    pub filter_sets: Vec<FilterSet>,
}

/// On-disk shape. The schema stays a plain field list until the version is checked.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedDocument {
    version: u32,
    #[serde(default)]
    schema: Vec<FieldDef>,
    #[serde(default)]
    records: Vec<RecordEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pivot: Option<PivotConfig>,
    #[serde(default)]
    filter_sets: Vec<FilterSet>,
}

impl DatasetDocument {
    pub fn new(schema: Schema, records: Vec<RecordEntity>) -> Self {
        DatasetDocument {
            schema,
            records,
            pivot: None,
            filter_sets: Vec::new(),
        }
    }

    pub fn with_pivot(mut self, config: PivotConfig) -> Self {
        self.pivot = Some(config);
        self
    }

    pub fn with_filter_set(mut self, filter_set: FilterSet) -> Self {
        self.filter_sets.push(filter_set);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, PersistenceError> {
        let saved: SavedDocument = serde_json::from_str(json)?;
        if saved.version != DOCUMENT_VERSION {
            return Err(PersistenceError::UnsupportedVersion(saved.version));
        }

        let document = DatasetDocument {
            schema: Schema::new(saved.schema)?,
            records: saved.records,
            pivot: saved.pivot,
            filter_sets: saved.filter_sets,
        };
        for key in document.unknown_pivot_keys() {
            warn!("pivot config references unknown field: {}", key);
        }
        Ok(document)
    }

    pub fn to_json_string(&self) -> Result<String, PersistenceError> {
        let saved = SavedDocument {
            version: DOCUMENT_VERSION,
            schema: self.schema.fields().to_vec(),
            records: self.records.clone(),
            pivot: self.pivot.clone(),
            filter_sets: self.filter_sets.clone(),
        };
        Ok(serde_json::to_string_pretty(&saved)?)
    }

    pub fn filter_set(&self, id: &str) -> Option<&FilterSet> {
        self.filter_sets.iter().find(|f| f.id == id)
    }

    /// Keys named by the stored pivot config that the schema doesn't declare.
    pub fn unknown_pivot_keys(&self) -> Vec<String> {
        self.pivot
            .as_ref()
            .map(|config| {
                config
                    .referenced_keys()
                    .into_iter()
                    .filter(|key| !self.schema.contains(key))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Runs the stored pivot, optionally through one of the stored filter sets.
    /// `None` when the document carries no pivot config.
    pub fn compute(&self, filter_set_id: Option<&str>) -> Option<PivotResult> {
        let config = self.pivot.as_ref()?;
        let filter_set = filter_set_id.and_then(|id| {
            let found = self.filter_set(id);
            if found.is_none() {
                warn!("filter set not found: {}", id);
            }
            found
        });
        Some(compute_pivot(&self.records, &self.schema, config, filter_set))
    }
}
