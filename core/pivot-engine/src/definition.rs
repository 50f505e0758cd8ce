//! FILENAME: core/pivot-engine/src/definition.rs
//! Pivot Definition - The serializable configuration.
//!
//! This module contains all the types needed to DESCRIBE a pivot:
//! - which dimension keys go on rows and columns
//! - which measure is summed
//! - slicers, row filters and named filter sets that restrict the records
//!
//! These structures are immutable snapshots of user intent. They are saved
//! with the dataset document and passed by reference into `compute_pivot`.

use std::collections::BTreeMap;

use pivot_model::{FieldKey, FieldValue};
use serde::{Deserialize, Deserializer, Serialize};

use crate::key::canonicalize;

// ============================================================================
// MEMBER VALUES
// ============================================================================

// Member lists in saved configs may hold any JSON scalar. They are stored as
// canonical keys so that `5`, `true` and `"North"` compare against records
// the same way record values do.

fn member_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let values = Vec::<FieldValue>::deserialize(deserializer)?;
    Ok(values.iter().map(canonicalize).collect())
}

fn member_map<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeMap<FieldKey, Vec<String>>, D::Error> {
    let raw = BTreeMap::<FieldKey, Vec<FieldValue>>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, values)| (key, values.iter().map(canonicalize).collect()))
        .collect())
}

// ============================================================================
// SLICERS
// ============================================================================

/// Desired value(s) for a slicer, held as canonical member keys.
/// JSON: a scalar or an array of scalars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SlicerSelection {
    Single(String),
    Multiple(Vec<String>),
}

impl<'de> Deserialize<'de> for SlicerSelection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Saved {
            Multiple(Vec<FieldValue>),
            Single(FieldValue),
        }

        Ok(match Saved::deserialize(deserializer)? {
            Saved::Single(value) => SlicerSelection::Single(canonicalize(&value)),
            Saved::Multiple(values) => SlicerSelection::Multiple(values.iter().map(canonicalize).collect()),
        })
    }
}

impl SlicerSelection {
    /// An empty string or an empty list imposes no constraint.
    pub fn is_unconstrained(&self) -> bool {
        match self {
            SlicerSelection::Single(s) => s.is_empty(),
            SlicerSelection::Multiple(values) => values.is_empty(),
        }
    }

    pub fn accepts(&self, member: &str) -> bool {
        match self {
            SlicerSelection::Single(s) => s == member,
            SlicerSelection::Multiple(values) => values.iter().any(|v| v == member),
        }
    }
}

impl From<&str> for SlicerSelection {
    fn from(value: &str) -> Self {
        SlicerSelection::Single(value.to_string())
    }
}

impl From<String> for SlicerSelection {
    fn from(value: String) -> Self {
        SlicerSelection::Single(value)
    }
}

impl From<Vec<String>> for SlicerSelection {
    fn from(values: Vec<String>) -> Self {
        SlicerSelection::Multiple(values)
    }
}

impl From<Vec<&str>> for SlicerSelection {
    fn from(values: Vec<&str>) -> Self {
        SlicerSelection::Multiple(values.into_iter().map(String::from).collect())
    }
}

// ============================================================================
// FILTER SETS
// ============================================================================

/// Whether a dimension filter keeps or drops its listed members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterMode {
    #[default]
    Include,
    Exclude,
}

/// Member list for one dimension. An empty list is no constraint in either mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionFilter {
    pub key: FieldKey,
    #[serde(default)]
    pub mode: FilterMode,
    #[serde(default, deserialize_with = "member_list")]
    pub values: Vec<String>,
}

impl DimensionFilter {
    pub fn include<S: Into<String>>(key: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        DimensionFilter {
            key: key.into(),
            mode: FilterMode::Include,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn exclude<S: Into<String>>(key: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        DimensionFilter {
            key: key.into(),
            mode: FilterMode::Exclude,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// A named conjunction of dimension filters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSet {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub filters: Vec<DimensionFilter>,
}

impl FilterSet {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        FilterSet {
            id: id.into(),
            name: name.into(),
            filters: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: DimensionFilter) -> Self {
        self.filters.push(filter);
        self
    }
}

// ============================================================================
// MAIN CONFIG STRUCT
// ============================================================================

/// The complete, serializable configuration of a pivot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotConfig {
    /// Row dimension keys (outer to inner).
    #[serde(default)]
    pub row_keys: Vec<FieldKey>,

    /// Column dimension keys (outer to inner).
    #[serde(default)]
    pub col_keys: Vec<FieldKey>,

    /// Allowed members per key. Empty lists impose no constraint.
    #[serde(default, deserialize_with = "member_map")]
    pub row_filters: BTreeMap<FieldKey, Vec<String>>,

    /// Keys exposed as slicers in the UI.
    #[serde(default)]
    pub slicer_keys: Vec<FieldKey>,

    /// Current slicer selections, keyed by slicer key.
    #[serde(default)]
    pub slicers: BTreeMap<FieldKey, SlicerSelection>,

    /// Field whose values are summed per cell.
    #[serde(default)]
    pub measure_key: FieldKey,

    /// Dimension keys whose declared axis domain is merged into the axis.
    #[serde(default)]
    pub include_empty_axis_items: Vec<FieldKey>,
}

impl PivotConfig {
    pub fn new<R, C>(row_keys: R, col_keys: C, measure_key: impl Into<String>) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        PivotConfig {
            row_keys: row_keys.into_iter().map(Into::into).collect(),
            col_keys: col_keys.into_iter().map(Into::into).collect(),
            measure_key: measure_key.into(),
            ..PivotConfig::default()
        }
    }

    /// Registers `key` as a slicer and sets its selection.
    pub fn with_slicer(mut self, key: impl Into<String>, selection: impl Into<SlicerSelection>) -> Self {
        let key = key.into();
        if !self.slicer_keys.contains(&key) {
            self.slicer_keys.push(key.clone());
        }
        self.slicers.insert(key, selection.into());
        self
    }

    pub fn with_row_filter<S: Into<String>>(
        mut self,
        key: impl Into<String>,
        allowed: impl IntoIterator<Item = S>,
    ) -> Self {
        self.row_filters
            .insert(key.into(), allowed.into_iter().map(Into::into).collect());
        self
    }

    pub fn include_empty_items(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        if !self.include_empty_axis_items.contains(&key) {
            self.include_empty_axis_items.push(key);
        }
        self
    }

    pub fn includes_empty_items(&self, key: &str) -> bool {
        self.include_empty_axis_items.iter().any(|k| k == key)
    }

    /// Every key referenced by the configuration, for validation by callers.
    pub fn referenced_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        let all = self
            .row_keys
            .iter()
            .chain(&self.col_keys)
            .chain(self.row_filters.keys())
            .chain(&self.slicer_keys)
            .chain(self.slicers.keys())
            .chain(std::iter::once(&self.measure_key))
            .chain(&self.include_empty_axis_items);
        for key in all {
            if !key.is_empty() && !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
        keys
    }
}
