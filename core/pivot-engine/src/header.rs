//! FILENAME: core/pivot-engine/src/header.rs
//! Header Span Builder - grouped column headers.
//!
//! One header row per column key. At depth `d` a run continues while the
//! tuple agrees with the run's first tuple on every level `<= d`. Column
//! tuples arrive sorted, so equal prefixes are contiguous and a group never
//! re-opens once closed.

use pivot_model::FieldKey;
use serde::Serialize;

use crate::tuple::Tuple;

/// A contiguous run of columns sharing one label at a header level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderSpan {
    pub label: String,
    /// Index of the first column covered by this span.
    pub start: usize,
    /// Number of columns covered.
    pub span: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderRow {
    pub key: FieldKey,
    pub depth: usize,
    pub spans: Vec<HeaderSpan>,
}

impl HeaderRow {
    /// Total columns covered; equals the column tuple count.
    pub fn width(&self) -> usize {
        self.spans.iter().map(|s| s.span).sum()
    }
}

pub fn build_spans(col_keys: &[FieldKey], col_tuples: &[Tuple]) -> Vec<HeaderRow> {
    col_keys
        .iter()
        .enumerate()
        .map(|(depth, key)| HeaderRow {
            key: key.clone(),
            depth,
            spans: spans_at_depth(col_tuples, depth),
        })
        .collect()
}

fn spans_at_depth(col_tuples: &[Tuple], depth: usize) -> Vec<HeaderSpan> {
    let mut spans: Vec<HeaderSpan> = Vec::new();
    let mut run_start = 0;

    for (i, tuple) in col_tuples.iter().enumerate() {
        if i > 0 && !tuple.shares_prefix(&col_tuples[run_start], depth) {
            spans.push(span(col_tuples, run_start, i, depth));
            run_start = i;
        }
    }
    if !col_tuples.is_empty() {
        spans.push(span(col_tuples, run_start, col_tuples.len(), depth));
    }
    spans
}

fn span(col_tuples: &[Tuple], start: usize, end: usize, depth: usize) -> HeaderSpan {
    HeaderSpan {
        label: col_tuples[start].value_at(depth).unwrap_or_default().to_string(),
        start,
        span: end - start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(pairs: &[(&str, &str)]) -> Vec<Tuple> {
        pairs
            .iter()
            .map(|(year, quarter)| Tuple::new([("year", *year), ("quarter", *quarter)]))
            .collect()
    }

    fn labels(row: &HeaderRow) -> Vec<(&str, usize)> {
        row.spans.iter().map(|s| (s.label.as_str(), s.span)).collect()
    }

    #[test]
    fn test_two_level_spans() {
        let tuples = cols(&[("2025", "Q3"), ("2025", "Q4"), ("2026", "Q1"), ("2026", "Q2"), ("2026", "Q3")]);
        let keys = vec!["year".to_string(), "quarter".to_string()];
        let rows = build_spans(&keys, &tuples);

        assert_eq!(rows.len(), 2);
        assert_eq!(labels(&rows[0]), vec![("2025", 2), ("2026", 3)]);
        assert_eq!(rows[1].spans.len(), 5);
        assert!(rows.iter().all(|r| r.width() == tuples.len()));
        assert_eq!(rows[0].spans[1].start, 2);
    }

    #[test]
    fn test_inner_level_breaks_at_outer_boundary() {
        // Same inner label on both sides of an outer boundary must not merge.
        let tuples = cols(&[("2025", "Q4"), ("2026", "Q4")]);
        let keys = vec!["year".to_string(), "quarter".to_string()];
        let rows = build_spans(&keys, &tuples);
        assert_eq!(labels(&rows[1]), vec![("Q4", 1), ("Q4", 1)]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(build_spans(&[], &[]).is_empty());
        let keys = vec!["year".to_string()];
        let rows = build_spans(&keys, &[]);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].spans.is_empty());
    }
}
