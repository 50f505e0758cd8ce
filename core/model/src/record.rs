//! FILENAME: core/model/src/record.rs
//! PURPOSE: The record entity consumed by the pivot engine.
//! CONTEXT: Records are immutable inputs to the engine. Editing collaborators
//! produce updated copies (`with_value`) rather than mutating in place.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

/// Stable, globally unique record identifier.
pub type RecordId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEntity {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Keys are a subset of the schema's field keys.
    #[serde(default)]
    pub data: BTreeMap<String, FieldValue>,
}

impl RecordEntity {
    pub fn new(id: impl Into<RecordId>) -> Self {
        let now = Utc::now();
        RecordEntity {
            id: id.into(),
            created_at: now,
            updated_at: now,
            data: BTreeMap::new(),
        }
    }

    /// Builder-style setter used while constructing a record.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Returns an updated copy with `key` set and `updated_at` bumped.
    pub fn with_value(&self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let mut next = self.clone();
        next.data.insert(key.into(), value.into());
        next.updated_at = Utc::now().max(self.updated_at);
        next
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.data.get(key)
    }
}
