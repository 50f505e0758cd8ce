//! FILENAME: core/pivot-engine/src/selection.rs
//! Selection mapping - rectangular (row, col) ranges onto pivot cells.
//!
//! Ranges are inclusive and may be given corner-to-corner in any direction.
//! Only cells that exist in the sparse map are returned.

use serde::Serialize;

use crate::aggregate::{CellKey, PivotCell};
use crate::engine::PivotResult;

/// Existing cells inside the rectangle spanned by `start` and `end`, ordered by (row, col).
pub fn cells_in_range(result: &PivotResult, start: CellKey, end: CellKey) -> Vec<(CellKey, &PivotCell)> {
    let (min_row, max_row) = (start.row.min(end.row), start.row.max(end.row));
    let (min_col, max_col) = (start.col.min(end.col), start.col.max(end.col));

    let mut found = Vec::new();
    for row in min_row..=max_row.min(result.row_count().saturating_sub(1)) {
        let lo = CellKey::new(row, min_col);
        let hi = CellKey::new(row, max_col);
        found.extend(result.cells.range(lo..=hi).map(|(k, c)| (*k, c)));
    }
    found
}

/// Aggregate figures for a selection, as shown in a status bar.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSummary {
    /// Existing cells in the range.
    pub cell_count: usize,
    /// Cells with a numeric value.
    pub value_count: usize,
    /// Contributing records across the selected cells.
    pub record_count: usize,
    /// Sum of cell values; `None` when no selected cell has a value.
    pub sum: Option<f64>,
}

pub fn summarize_selection(result: &PivotResult, start: CellKey, end: CellKey) -> SelectionSummary {
    let mut summary = SelectionSummary::default();
    for (_, cell) in cells_in_range(result, start, end) {
        summary.cell_count += 1;
        summary.record_count += cell.record_count();
        if let Some(v) = cell.value {
            summary.value_count += 1;
            summary.sum = Some(summary.sum.unwrap_or(0.0) + v);
        }
    }
    summary
}
