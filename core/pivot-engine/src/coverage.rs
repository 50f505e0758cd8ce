//! FILENAME: core/pivot-engine/src/coverage.rs
//! Coverage / Style Resolver - flag tallies to cell decorations.
//!
//! Coverage of a flag in a cell compares its true-count with the number of
//! contributing records. Style resolution walks flag fields by descending
//! priority (declared order breaks ties) and applies the first rule that
//! sets a color for the cell's coverage state. Rules are never blended.

use pivot_model::{FieldRole, FlagStyle, Schema, StyleRule};
use serde::{Deserialize, Serialize};

use crate::aggregate::PivotCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Coverage {
    /// No contributing record has the flag set.
    None,
    /// Some, but not all, contributing records have the flag set.
    Some,
    /// Every contributing record has the flag set.
    All,
}

impl Coverage {
    pub fn classify(true_count: u32, total: usize) -> Coverage {
        if true_count == 0 {
            Coverage::None
        } else if true_count as usize >= total {
            Coverage::All
        } else {
            Coverage::Some
        }
    }

    /// The rule a flag style declares for this state.
    pub fn rule(self, style: &FlagStyle) -> Option<&StyleRule> {
        match self {
            Coverage::None => style.none.as_ref(),
            Coverage::Some => style.some.as_ref(),
            Coverage::All => style.all.as_ref(),
        }
    }
}

/// Coverage of `flag_key` within `cell`.
pub fn coverage(cell: &PivotCell, flag_key: &str) -> Coverage {
    Coverage::classify(cell.flag_count(flag_key), cell.record_count())
}

/// Decoration chosen for a cell, with the flag that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStyle {
    pub flag_key: String,
    pub coverage: Coverage,
    pub background: Option<String>,
    pub text_color: Option<String>,
}

/// Resolves the decoration for a cell. Cells without records are never styled.
pub fn resolve_style(schema: &Schema, cell: &PivotCell) -> Option<ResolvedStyle> {
    if cell.record_count() == 0 {
        return None;
    }

    let mut flags: Vec<(&str, &FlagStyle)> = schema
        .fields_with_role(FieldRole::Flag)
        .filter_map(|f| f.flag_style.as_ref().map(|style| (f.key.as_str(), style)))
        .collect();
    // Stable: equal priorities keep schema order.
    flags.sort_by(|a, b| b.1.priority.cmp(&a.1.priority));

    flags.into_iter().find_map(|(key, style)| {
        let state = coverage(cell, key);
        state
            .rule(style)
            .filter(|rule| rule.is_effective())
            .map(|rule| ResolvedStyle {
                flag_key: key.to_string(),
                coverage: state,
                background: rule.background.clone(),
                text_color: rule.text_color.clone(),
            })
    })
}
