//! FILENAME: core/pivot-engine/src/view.rs
//! Pivot Grid - Renderable 2D layout of a pivot result.
//!
//! Layout:
//! - a header band: one row per column key (at least one row)
//! - row-label columns: one per row key
//! - a data cell per (row tuple, column tuple), styled by the flag resolver
//!
//! Grid coordinates map back to `CellKey`s through `PivotGrid::cell_key_at`,
//! which is what selection handling in the UI uses.

use pivot_model::Schema;
use serde::Serialize;

use crate::aggregate::CellKey;
use crate::coverage::{resolve_style, ResolvedStyle};
use crate::definition::PivotConfig;
use crate::engine::PivotResult;

// ============================================================================
// CELL TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GridCellKind {
    /// Top-left area above the row labels.
    Corner,
    /// Row label.
    RowHeader,
    /// Column header label (first column of its span).
    ColumnHeader,
    /// Covered by a column header span to its left.
    Covered,
    /// Aggregated value.
    Data,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum GridValue {
    Empty,
    Number(f64),
    Text(String),
}

impl GridValue {
    pub fn text(s: impl Into<String>) -> Self {
        GridValue::Text(s.into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub value: GridValue,
    pub kind: GridCellKind,
    /// Columns spanned (header labels only, 1 otherwise).
    pub col_span: usize,
    /// Contributing records (data cells only).
    pub record_count: usize,
    pub style: Option<ResolvedStyle>,
}

impl GridCell {
    fn new(value: GridValue, kind: GridCellKind) -> Self {
        GridCell {
            value,
            kind,
            col_span: 1,
            record_count: 0,
            style: None,
        }
    }
}

/// Display label for a blank member.
pub const BLANK_LABEL: &str = "(blank)";

fn member_label(member: &str) -> String {
    if member.is_empty() {
        BLANK_LABEL.to_string()
    } else {
        member.to_string()
    }
}

fn field_label(schema: &Schema, key: &str) -> String {
    schema
        .field(key)
        .map(|f| f.label.clone())
        .unwrap_or_else(|| key.to_string())
}

// ============================================================================
// GRID
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotGrid {
    pub header_row_count: usize,
    pub row_label_col_count: usize,
    pub cells: Vec<Vec<GridCell>>,
}

impl PivotGrid {
    pub fn build(result: &PivotResult, config: &PivotConfig, schema: &Schema) -> Self {
        let row_label_cols = result.row_keys.len();
        let header_rows = result.header_rows();
        let header_row_count = header_rows.len().max(1);
        let mut cells: Vec<Vec<GridCell>> = Vec::with_capacity(header_row_count + result.row_count());

        // Header band
        for band_row in 0..header_row_count {
            let mut line: Vec<GridCell> = Vec::with_capacity(row_label_cols + result.col_count());
            let is_last = band_row + 1 == header_row_count;

            for key in &result.row_keys {
                let value = if is_last {
                    GridValue::Text(field_label(schema, key))
                } else {
                    GridValue::Empty
                };
                line.push(GridCell::new(value, GridCellKind::Corner));
            }

            match header_rows.get(band_row) {
                Some(header) => {
                    for span in &header.spans {
                        let mut label = GridCell::new(GridValue::text(member_label(&span.label)), GridCellKind::ColumnHeader);
                        label.col_span = span.span;
                        line.push(label);
                        for _ in 1..span.span {
                            line.push(GridCell::new(GridValue::Empty, GridCellKind::Covered));
                        }
                    }
                }
                None => {
                    // No column keys: label the single value column with the measure.
                    for _ in 0..result.col_count() {
                        let label = field_label(schema, &config.measure_key);
                        line.push(GridCell::new(GridValue::Text(label), GridCellKind::ColumnHeader));
                    }
                }
            }
            cells.push(line);
        }

        // Data rows
        for (row, tuple) in result.row_tuples.iter().enumerate() {
            let mut line: Vec<GridCell> = Vec::with_capacity(row_label_cols + result.col_count());
            let previous = row.checked_sub(1).map(|r| &result.row_tuples[r]);

            for depth in 0..row_label_cols {
                // Outer labels repeat only when the group changes.
                let repeated = previous.map_or(false, |p| p.shares_prefix(tuple, depth));
                let value = if repeated {
                    GridValue::Empty
                } else {
                    GridValue::Text(member_label(tuple.value_at(depth).unwrap_or_default()))
                };
                line.push(GridCell::new(value, GridCellKind::RowHeader));
            }

            for col in 0..result.col_count() {
                let mut data = GridCell::new(GridValue::Empty, GridCellKind::Data);
                if let Some(cell) = result.cell(row, col) {
                    if let Some(v) = cell.value {
                        data.value = GridValue::Number(v);
                    }
                    data.record_count = cell.record_count();
                    data.style = resolve_style(schema, cell);
                }
                line.push(data);
            }
            cells.push(line);
        }

        PivotGrid {
            header_row_count,
            row_label_col_count: row_label_cols,
            cells,
        }
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn col_count(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn get(&self, grid_row: usize, grid_col: usize) -> Option<&GridCell> {
        self.cells.get(grid_row)?.get(grid_col)
    }

    /// Maps grid coordinates onto the pivot cell key, if they fall in the data area.
    pub fn cell_key_at(&self, grid_row: usize, grid_col: usize) -> Option<CellKey> {
        let row = grid_row.checked_sub(self.header_row_count)?;
        let col = grid_col.checked_sub(self.row_label_col_count)?;
        (row + self.header_row_count < self.row_count() && col + self.row_label_col_count < self.col_count())
            .then(|| CellKey::new(row, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compute_pivot;
    use pivot_model::{FieldDef, FieldRole, FieldType, FlagStyle, RecordEntity, StyleRule};

    fn schema() -> Schema {
        Schema::new(vec![
            FieldDef::new("region", "Region", FieldType::String).with_roles(&[FieldRole::RowDim]),
            FieldDef::new("year", "Year", FieldType::String).with_roles(&[FieldRole::ColDim]),
            FieldDef::new("q", "Quarter", FieldType::String).with_roles(&[FieldRole::ColDim]),
            FieldDef::new("sales", "Sales", FieldType::Number).with_roles(&[FieldRole::Measure]),
            FieldDef::new("late", "Late", FieldType::Boolean)
                .with_roles(&[FieldRole::Flag])
                .with_flag_style(FlagStyle {
                    priority: 1,
                    all: Some(StyleRule { background: Some("#fdd".into()), text_color: None }),
                    ..FlagStyle::default()
                }),
        ])
        .unwrap()
    }

    fn records() -> Vec<RecordEntity> {
        vec![
            RecordEntity::new("1").with("region", "North").with("year", "2025").with("q", "Q4").with("sales", 10).with("late", true),
            RecordEntity::new("2").with("region", "North").with("year", "2026").with("q", "Q1").with("sales", 20),
            RecordEntity::new("3").with("region", "South").with("year", "2026").with("q", "Q2").with("sales", 30),
        ]
    }

    #[test]
    fn test_grid_layout() {
        let config = PivotConfig::new(["region"], ["year", "q"], "sales");
        let schema = schema();
        let result = compute_pivot(&records(), &schema, &config, None);
        let grid = PivotGrid::build(&result, &config, &schema);

        assert_eq!(grid.header_row_count, 2);
        assert_eq!(grid.row_label_col_count, 1);
        assert_eq!(grid.row_count(), 4);
        assert_eq!(grid.col_count(), 4);

        // Year band: 2025 spans 1, 2026 spans 2.
        assert_eq!(grid.get(0, 1).unwrap().value, GridValue::text("2025"));
        assert_eq!(grid.get(0, 2).unwrap().col_span, 2);
        assert_eq!(grid.get(0, 3).unwrap().kind, GridCellKind::Covered);
        assert_eq!(grid.get(1, 0).unwrap().value, GridValue::text("Region"));

        assert_eq!(grid.get(2, 0).unwrap().value, GridValue::text("North"));
        assert_eq!(grid.get(2, 1).unwrap().value, GridValue::Number(10.0));
        assert_eq!(grid.get(2, 3).unwrap().value, GridValue::Empty);
        assert_eq!(grid.get(3, 3).unwrap().value, GridValue::Number(30.0));

        let styled = grid.get(2, 1).unwrap().style.as_ref().unwrap();
        assert_eq!(styled.flag_key, "late");
        assert!(grid.get(2, 2).unwrap().style.is_none());
    }

    #[test]
    fn test_cell_key_mapping() {
        let config = PivotConfig::new(["region"], ["year", "q"], "sales");
        let schema = schema();
        let result = compute_pivot(&records(), &schema, &config, None);
        let grid = PivotGrid::build(&result, &config, &schema);

        assert_eq!(grid.cell_key_at(2, 1), Some(CellKey::new(0, 0)));
        assert_eq!(grid.cell_key_at(3, 3), Some(CellKey::new(1, 2)));
        assert_eq!(grid.cell_key_at(1, 1), None);
        assert_eq!(grid.cell_key_at(2, 0), None);
        assert_eq!(grid.cell_key_at(4, 1), None);
    }

    #[test]
    fn test_no_column_keys_uses_measure_label() {
        let config = PivotConfig::new(["region"], Vec::<String>::new(), "sales");
        let schema = schema();
        let result = compute_pivot(&records(), &schema, &config, None);
        let grid = PivotGrid::build(&result, &config, &schema);

        assert_eq!(grid.header_row_count, 1);
        assert_eq!(grid.get(0, 1).unwrap().value, GridValue::text("Sales"));
        assert_eq!(grid.get(1, 1).unwrap().value, GridValue::Number(30.0));
        assert_eq!(grid.get(2, 1).unwrap().value, GridValue::Number(30.0));
    }

    #[test]
    fn test_blank_members_are_labelled() {
        let records = vec![RecordEntity::new("1").with("sales", 1)];
        let config = PivotConfig::new(["region"], Vec::<String>::new(), "sales");
        let schema = schema();
        let result = compute_pivot(&records, &schema, &config, None);
        let grid = PivotGrid::build(&result, &config, &schema);
        assert_eq!(grid.get(1, 0).unwrap().value, GridValue::text(BLANK_LABEL));
    }
}
