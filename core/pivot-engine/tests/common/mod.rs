//! FILENAME: tests/common/mod.rs
//! Fixtures and assertion helpers for pivot-engine integration tests.

#![allow(dead_code)]

use pivot_engine::{PivotResult, Tuple};
use pivot_model::{
    AxisDomain, FieldDef, FieldRole, FieldType, FlagStyle, RecordEntity, Schema, StyleRule,
};

/// Sales-like dataset: region x product x day, with two flags.
pub struct SalesFixture;

impl SalesFixture {
    pub fn schema() -> Schema {
        Schema::new(vec![
            FieldDef::new("region", "Region", FieldType::String)
                .with_roles(&[FieldRole::RowDim, FieldRole::Slicer]),
            FieldDef::new("product", "Product", FieldType::String)
                .with_roles(&[FieldRole::RowDim, FieldRole::ColDim]),
            FieldDef::new("day", "Day", FieldType::Date)
                .with_roles(&[FieldRole::ColDim])
                .with_axis_domain(AxisDomain::DateRange {
                    start: Some("2026-01-01".to_string()),
                    end: Some("2026-01-03".to_string()),
                    include_weekends: false,
                }),
            FieldDef::new("status", "Status", FieldType::String)
                .with_roles(&[FieldRole::ColDim])
                .with_enum_values(["open", "shipped", "closed"])
                .with_axis_domain(AxisDomain::Enum),
            FieldDef::new("sales", "Sales", FieldType::Number).with_roles(&[FieldRole::Measure]),
            FieldDef::new("returned", "Returned", FieldType::Boolean)
                .with_roles(&[FieldRole::Flag])
                .with_flag_style(FlagStyle {
                    priority: 10,
                    all: Some(paint("#f88")),
                    some: Some(paint("#fcc")),
                    ..FlagStyle::default()
                }),
            FieldDef::new("priority", "Priority", FieldType::Boolean)
                .with_roles(&[FieldRole::Flag])
                .with_flag_style(FlagStyle {
                    priority: 1,
                    all: Some(StyleRule { background: None, text_color: Some("#00f".to_string()) }),
                    ..FlagStyle::default()
                }),
        ])
        .expect("fixture schema is valid")
    }

    /// (id, region, product, day, status, sales, returned, priority)
    pub fn data() -> Vec<(&'static str, &'static str, &'static str, &'static str, &'static str, f64, bool, bool)> {
        vec![
            ("r01", "North", "Widget", "2026-01-01", "open", 100.0, false, true),
            ("r02", "North", "Widget", "2026-01-01", "open", 120.0, true, true),
            ("r03", "North", "Gadget", "2026-01-01", "shipped", 80.0, false, false),
            ("r04", "South", "Widget", "2026-01-01", "shipped", 150.0, true, false),
            ("r05", "South", "Gadget", "2026-01-01", "closed", 110.0, false, false),
            ("r06", "East", "Widget", "2026-01-01", "open", 90.0, false, true),
            ("r07", "East", "Gadget", "2026-01-01", "closed", 70.0, true, false),
            ("r08", "East", "Gadget", "2026-01-01", "closed", 85.0, true, false),
        ]
    }

    pub fn records() -> Vec<RecordEntity> {
        Self::data()
            .into_iter()
            .map(|(id, region, product, day, status, sales, returned, priority)| {
                RecordEntity::new(id)
                    .with("region", region)
                    .with("product", product)
                    .with("day", day)
                    .with("status", status)
                    .with("sales", sales)
                    .with("returned", returned)
                    .with("priority", priority)
            })
            .collect()
    }
}

fn paint(background: &str) -> StyleRule {
    StyleRule { background: Some(background.to_string()), text_color: None }
}

/// The records from the worked three-record example: x/y dimensions, m measure.
pub fn xy_records() -> Vec<RecordEntity> {
    vec![
        RecordEntity::new("a").with("x", "X1").with("y", "Y1").with("m", 2),
        RecordEntity::new("b").with("x", "X1").with("y", "Y1").with("m", 3),
        RecordEntity::new("c").with("x", "X2").with("y", "Y1").with("m", 5),
    ]
}

// ============================================================================
// ASSERTION HELPERS
// ============================================================================

/// Member values of one key across a tuple list.
pub fn members(tuples: &[Tuple], key: &str) -> Vec<String> {
    tuples
        .iter()
        .map(|t| t.get(key).unwrap_or_default().to_string())
        .collect()
}

/// Assert that the cell at (row, col) holds `expected` and the given record ids (any order).
pub fn assert_cell(result: &PivotResult, row: usize, col: usize, expected: Option<f64>, ids: &[&str]) {
    let cell = result
        .cell(row, col)
        .unwrap_or_else(|| panic!("expected a cell at {}:{}", row, col));
    assert_eq!(cell.value, expected, "value at {}:{}", row, col);

    let mut actual: Vec<&str> = cell.record_ids.iter().map(String::as_str).collect();
    actual.sort();
    let mut wanted = ids.to_vec();
    wanted.sort();
    assert_eq!(actual, wanted, "record ids at {}:{}", row, col);
}
