//! FILENAME: core/pivot-engine/src/aggregate.rs
//! Cell Aggregator - one pass over the admitted records.
//!
//! For each record (in input order) the aggregator locates the
//! (row, column) cell, appends the record id, tallies flags and sums the
//! measure. Accumulation happens in a mutable sparse map keyed by integer
//! indices; the result is frozen into an ordered map at the end.
//!
//! A cell's value stays `None` until some record contributes a usable
//! number. Non-numeric measures are not treated as zero.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::trace;
use pivot_model::{FieldKey, RecordEntity, RecordId, Schema};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::grouper::TupleGroups;
use crate::reader::RecordReader;
use crate::tuple::Tuple;

// ============================================================================
// CELL KEY
// ============================================================================

/// Position of a cell: row index and column index into the sorted tuple lists.
/// Its string form is `"{row}:{col}"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub row: usize,
    pub col: usize,
}

impl CellKey {
    pub fn new(row: usize, col: usize) -> Self {
        CellKey { row, col }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CellKeyError {
    #[error("Cell key must look like 'row:col', got '{0}'")]
    Malformed(String),

    #[error("Invalid index in cell key '{0}'")]
    InvalidIndex(String),
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}

impl FromStr for CellKey {
    type Err = CellKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, col) = s
            .split_once(':')
            .ok_or_else(|| CellKeyError::Malformed(s.to_string()))?;
        let row = row
            .parse::<usize>()
            .map_err(|_| CellKeyError::InvalidIndex(s.to_string()))?;
        let col = col
            .parse::<usize>()
            .map_err(|_| CellKeyError::InvalidIndex(s.to_string()))?;
        Ok(CellKey { row, col })
    }
}

impl Serialize for CellKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// PIVOT CELL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotCell {
    /// Sum of usable measure values; `None` if no record contributed one.
    pub value: Option<f64>,

    /// Contributing record ids, in record iteration order.
    pub record_ids: Vec<RecordId>,

    /// True-count per schema flag key (every flag key present, zero if none).
    pub flag_summary: BTreeMap<FieldKey, u32>,
}

impl PivotCell {
    fn empty(flag_keys: &[FieldKey]) -> Self {
        PivotCell {
            value: None,
            record_ids: Vec::new(),
            flag_summary: flag_keys.iter().map(|k| (k.clone(), 0)).collect(),
        }
    }

    pub fn record_count(&self) -> usize {
        self.record_ids.len()
    }

    pub fn flag_count(&self, key: &str) -> u32 {
        self.flag_summary.get(key).copied().unwrap_or(0)
    }

    fn add_measure(&mut self, n: f64) {
        self.value = Some(self.value.unwrap_or(0.0) + n);
    }
}

/// Sparse cell map, ordered by (row, col).
pub type CellMap = BTreeMap<CellKey, PivotCell>;

// ============================================================================
// AGGREGATION
// ============================================================================

/// Aggregates admitted records into cells.
pub fn aggregate(
    records: &[&RecordEntity],
    schema: &Schema,
    groups: &TupleGroups,
    measure_key: &str,
    flag_keys: &[FieldKey],
) -> CellMap {
    let mut accumulator: FxHashMap<CellKey, PivotCell> = FxHashMap::default();

    for record in records {
        let reader = RecordReader::new(record, schema);
        let row_tuple = Tuple::project(&reader, groups.rows.keys());
        let col_tuple = Tuple::project(&reader, groups.cols.keys());

        let (row, col) = match (groups.rows.position(&row_tuple), groups.cols.position(&col_tuple)) {
            (Some(row), Some(col)) => (row, col),
            _ => {
                trace!("record {} has no axis position, skipped", record.id);
                continue;
            }
        };

        let cell = accumulator
            .entry(CellKey::new(row, col))
            .or_insert_with(|| PivotCell::empty(flag_keys));

        cell.record_ids.push(record.id.clone());

        for key in flag_keys {
            if reader.flag(key) {
                if let Some(count) = cell.flag_summary.get_mut(key) {
                    *count += 1;
                }
            }
        }

        if let Some(n) = reader.measure(measure_key) {
            cell.add_measure(n);
        }
    }

    accumulator.into_iter().collect()
}
