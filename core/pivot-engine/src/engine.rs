//! FILENAME: core/pivot-engine/src/engine.rs
//! Pivot Engine - The calculation core that turns records into a pivot result.
//!
//! This module takes a `PivotConfig` (configuration), a `Schema` and the
//! current records, and produces a `PivotResult` (sorted tuples + sparse cells).
//!
//! Algorithm:
//! 1. Apply slicers, row filters and the filter set (predicate stack)
//! 2. Expand declared axis domains for keys that opt into empty items
//! 3. Group admitted records into sorted row / column tuples
//! 4. Aggregate: one pass over admitted records into the cell map
//!
//! Every call recomputes from scratch. Results are a deterministic function
//! of the inputs.

use log::debug;
use pivot_model::{FieldKey, RecordEntity, Schema};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::aggregate::{aggregate, CellKey, CellMap, PivotCell};
use crate::definition::{FilterSet, PivotConfig};
use crate::domain::expand_field;
use crate::filter;
use crate::grouper::{group_with_domains, AxisExpansions};
use crate::header::{build_spans, HeaderRow};
use crate::key::compare_members;
use crate::reader::RecordReader;
use crate::tuple::Tuple;

// ============================================================================
// RESULT
// ============================================================================

/// Output of one pivot computation.
///
/// Every cell key indexes into `row_tuples` / `col_tuples`. Tuples forced by
/// an axis domain with no contributing record have no cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotResult {
    pub row_keys: Vec<FieldKey>,
    pub col_keys: Vec<FieldKey>,
    pub row_tuples: Vec<Tuple>,
    pub col_tuples: Vec<Tuple>,
    pub cells: CellMap,
    /// Number of records that passed the predicate stack.
    pub admitted_count: usize,
}

impl PivotResult {
    pub fn row_count(&self) -> usize {
        self.row_tuples.len()
    }

    pub fn col_count(&self) -> usize {
        self.col_tuples.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&PivotCell> {
        self.cells.get(&CellKey::new(row, col))
    }

    /// Summed value at (row, col); `None` for empty cells and cells whose
    /// records carried no usable measure.
    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        self.cell(row, col).and_then(|c| c.value)
    }

    pub fn row_position(&self, tuple: &Tuple) -> Option<usize> {
        self.row_tuples.iter().position(|t| t == tuple)
    }

    pub fn col_position(&self, tuple: &Tuple) -> Option<usize> {
        self.col_tuples.iter().position(|t| t == tuple)
    }

    /// Cell at the intersection of two tuples.
    pub fn cell_for(&self, row_tuple: &Tuple, col_tuple: &Tuple) -> Option<&PivotCell> {
        let row = self.row_position(row_tuple)?;
        let col = self.col_position(col_tuple)?;
        self.cell(row, col)
    }

    /// Grouped column headers, one row per column key.
    pub fn header_rows(&self) -> Vec<HeaderRow> {
        build_spans(&self.col_keys, &self.col_tuples)
    }
}

// ============================================================================
// PIVOT CALCULATOR
// ============================================================================

/// The main calculation engine for a pivot.
pub struct PivotCalculator<'a> {
    records: &'a [RecordEntity],
    schema: &'a Schema,
    config: &'a PivotConfig,
    filter_set: Option<&'a FilterSet>,
}

impl<'a> PivotCalculator<'a> {
    pub fn new(
        records: &'a [RecordEntity],
        schema: &'a Schema,
        config: &'a PivotConfig,
        filter_set: Option<&'a FilterSet>,
    ) -> Self {
        PivotCalculator {
            records,
            schema,
            config,
            filter_set,
        }
    }

    /// Executes the full calculation.
    pub fn calculate(&self) -> PivotResult {
        // Step 1: Predicate stack
        let admitted = filter::admitted(self.records, self.schema, self.config, self.filter_set);

        // Step 2: Axis domains for opted-in dimension keys
        let expansions = self.axis_expansions();

        // Step 3: Tuple universes
        let groups = group_with_domains(
            &admitted,
            self.schema,
            &self.config.row_keys,
            &self.config.col_keys,
            &expansions,
        );

        // Step 4: Cells
        let flag_keys = self.schema.flag_keys();
        let cells = aggregate(&admitted, self.schema, &groups, &self.config.measure_key, &flag_keys);

        debug!(
            "pivot computed: {}/{} records admitted, {} rows x {} cols, {} cells",
            admitted.len(),
            self.records.len(),
            groups.rows.len(),
            groups.cols.len(),
            cells.len()
        );

        PivotResult {
            row_keys: self.config.row_keys.clone(),
            col_keys: self.config.col_keys.clone(),
            row_tuples: groups.rows.into_tuples(),
            col_tuples: groups.cols.into_tuples(),
            cells,
            admitted_count: admitted.len(),
        }
    }

    /// Declared domain members for every axis key named in
    /// `include_empty_axis_items` that has a field with an axis domain.
    fn axis_expansions(&self) -> AxisExpansions {
        let mut expansions = AxisExpansions::default();
        let axis_keys = self.config.row_keys.iter().chain(&self.config.col_keys);

        for key in axis_keys {
            if !self.config.includes_empty_items(key) {
                continue;
            }
            let members = self.schema.field(key).and_then(expand_field);
            match members {
                Some(members) => {
                    expansions.insert(key.clone(), members);
                }
                None => debug!("field {} requests empty items but declares no axis domain", key),
            }
        }
        expansions
    }
}

// ============================================================================
// DRILL DOWN
// ============================================================================

/// Source records behind a single cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillDownResult<'a> {
    pub key: CellKey,
    pub row_tuple: Tuple,
    pub col_tuple: Tuple,
    /// Contributing records in record-id order of the cell, up to `max_records`.
    pub records: Vec<&'a RecordEntity>,
    pub total_count: usize,
    pub is_truncated: bool,
}

/// Looks up the records that contributed to the cell at `key`.
/// `None` when the key indexes outside the result's axes.
pub fn drill_down<'a>(
    result: &PivotResult,
    records: &'a [RecordEntity],
    key: CellKey,
    max_records: usize,
) -> Option<DrillDownResult<'a>> {
    let row_tuple = result.row_tuples.get(key.row)?.clone();
    let col_tuple = result.col_tuples.get(key.col)?.clone();

    let ids: &[String] = result
        .cells
        .get(&key)
        .map(|c| c.record_ids.as_slice())
        .unwrap_or_default();

    let by_id: FxHashMap<&str, &'a RecordEntity> =
        records.iter().map(|r| (r.id.as_str(), r)).collect();

    let found: Vec<&'a RecordEntity> = ids
        .iter()
        .filter_map(|id| by_id.get(id.as_str()).copied())
        .take(max_records)
        .collect();

    Some(DrillDownResult {
        key,
        row_tuple,
        col_tuple,
        records: found,
        total_count: ids.len(),
        is_truncated: ids.len() > max_records,
    })
}

// ============================================================================
// MEMBER LISTS
// ============================================================================

/// Distinct canonical members of `key` across `records`, sorted.
/// Used to populate slicer and filter pickers.
pub fn distinct_members(records: &[RecordEntity], schema: &Schema, key: &str) -> Vec<String> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut members: Vec<String> = Vec::new();
    for record in records {
        let member = RecordReader::new(record, schema).member(key);
        if seen.insert(member.clone()) {
            members.push(member);
        }
    }
    members.sort_by(|a, b| compare_members(a, b));
    members
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Computes a pivot from records, schema and configuration.
/// This is the main entry point for the calculation engine.
pub fn compute_pivot(
    records: &[RecordEntity],
    schema: &Schema,
    config: &PivotConfig,
    filter_set: Option<&FilterSet>,
) -> PivotResult {
    PivotCalculator::new(records, schema, config, filter_set).calculate()
}
