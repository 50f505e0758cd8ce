//! FILENAME: core/pivot-engine/src/lib.rs
//! Pivot computation engine.
//!
//! Slices a flat record collection into a cross-tabulated view: records are
//! grouped into row and column tuples, the measure is summed per cell and
//! flag fields are tallied per cell for conditional styling. It depends on
//! `pivot-model` for the record and schema types.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the pivot IS)
//! - `key`, `reader`, `tuple`: canonical member keys and record projection
//! - `filter`, `domain`, `grouper`, `aggregate`: the computation steps
//! - `engine`: Calculation entry point (HOW we calculate)
//! - `header`, `coverage`, `view`, `selection`: consumers of the result (WHAT we display)

pub mod aggregate;
pub mod coverage;
pub mod definition;
pub mod domain;
pub mod engine;
pub mod filter;
pub mod grouper;
pub mod header;
pub mod key;
pub mod reader;
pub mod selection;
pub mod tuple;
pub mod view;

pub use aggregate::{CellKey, CellKeyError, CellMap, PivotCell};
pub use coverage::{coverage, resolve_style, Coverage, ResolvedStyle};
pub use definition::*;
pub use engine::{compute_pivot, distinct_members, drill_down, DrillDownResult, PivotCalculator, PivotResult};
pub use header::{build_spans, HeaderRow, HeaderSpan};
pub use key::{canonicalize, compare_members};
pub use selection::{cells_in_range, summarize_selection, SelectionSummary};
pub use tuple::Tuple;
pub use view::{GridCell, GridCellKind, GridValue, PivotGrid};
