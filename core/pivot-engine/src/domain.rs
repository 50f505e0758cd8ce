//! FILENAME: core/pivot-engine/src/domain.rs
//! Axis Domain Expander - declared axis members independent of the data.
//!
//! Consulted only for dimension fields named in
//! `PivotConfig::include_empty_axis_items`. Expansion never fails: a date
//! range with a missing or unparseable bound yields no members.

use chrono::{Datelike, NaiveDate, Weekday};
use pivot_model::{AxisDomain, FieldDef};

use crate::key::DATE_KEY_FORMAT;

/// Expands a declared domain into its ordered member keys.
pub fn expand(domain: &AxisDomain, enum_values: Option<&[String]>) -> Vec<String> {
    match domain {
        AxisDomain::List { values } => values.clone(),
        AxisDomain::Enum => enum_values.map(<[String]>::to_vec).unwrap_or_default(),
        AxisDomain::DateRange { start, end, include_weekends } => {
            match DateSpan::parse(start.as_deref(), end.as_deref(), *include_weekends) {
                Some(span) => span.map(|d| d.format(DATE_KEY_FORMAT).to_string()).collect(),
                None => Vec::new(),
            }
        }
    }
}

/// Expands the axis domain declared on `field`, if any.
pub fn expand_field(field: &FieldDef) -> Option<Vec<String>> {
    field
        .axis_domain
        .as_ref()
        .map(|domain| expand(domain, field.enum_values.as_deref()))
}

// ============================================================================
// DATE SPAN
// ============================================================================

/// Ascending, inclusive run of calendar days.
///
/// Cloning the span restarts iteration from its current position, so a fresh
/// span can be walked any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSpan {
    next: Option<NaiveDate>,
    end: NaiveDate,
    include_weekends: bool,
}

impl DateSpan {
    pub fn new(start: NaiveDate, end: NaiveDate, include_weekends: bool) -> Self {
        DateSpan {
            next: (start <= end).then_some(start),
            end,
            include_weekends,
        }
    }

    /// Parses `YYYY-MM-DD` bounds. `None` when either bound is missing or invalid.
    pub fn parse(start: Option<&str>, end: Option<&str>, include_weekends: bool) -> Option<Self> {
        let start = NaiveDate::parse_from_str(start?.trim(), DATE_KEY_FORMAT).ok()?;
        let end = NaiveDate::parse_from_str(end?.trim(), DATE_KEY_FORMAT).ok()?;
        Some(DateSpan::new(start, end, include_weekends))
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

impl Iterator for DateSpan {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        loop {
            let current = self.next?;
            self.next = current.succ_opt().filter(|d| *d <= self.end);
            if self.include_weekends || !is_weekend(current) {
                return Some(current);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: Option<&str>, end: Option<&str>, include_weekends: bool) -> AxisDomain {
        AxisDomain::DateRange {
            start: start.map(String::from),
            end: end.map(String::from),
            include_weekends,
        }
    }

    #[test]
    fn test_list_domain_keeps_order() {
        let domain = AxisDomain::List { values: vec!["b".into(), "a".into(), "c".into()] };
        assert_eq!(expand(&domain, None), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_enum_domain() {
        let values = vec!["high".to_string(), "low".to_string()];
        assert_eq!(expand(&AxisDomain::Enum, Some(&values)), vec!["high", "low"]);
        assert!(expand(&AxisDomain::Enum, None).is_empty());
    }

    #[test]
    fn test_date_range_skips_weekends() {
        // 2026-01-01 is a Thursday, 2026-01-03 a Saturday.
        let domain = range(Some("2026-01-01"), Some("2026-01-05"), false);
        assert_eq!(expand(&domain, None), vec!["2026-01-01", "2026-01-02", "2026-01-05"]);

        let domain = range(Some("2026-01-01"), Some("2026-01-03"), true);
        assert_eq!(expand(&domain, None), vec!["2026-01-01", "2026-01-02", "2026-01-03"]);
    }

    #[test]
    fn test_date_range_degenerate_bounds() {
        assert!(expand(&range(None, Some("2026-01-03"), true), None).is_empty());
        assert!(expand(&range(Some("2026-01-01"), None, true), None).is_empty());
        assert!(expand(&range(Some("soon"), Some("2026-01-03"), true), None).is_empty());
        assert!(expand(&range(Some("2026-01-05"), Some("2026-01-01"), true), None).is_empty());
        assert_eq!(expand(&range(Some("2026-01-01"), Some("2026-01-01"), true), None).len(), 1);
        // A weekend-only span with weekends excluded is empty.
        assert!(expand(&range(Some("2026-01-03"), Some("2026-01-04"), false), None).is_empty());
    }

    #[test]
    fn test_span_restarts_when_cloned() {
        let span = DateSpan::parse(Some("2026-02-27"), Some("2026-03-02"), true).unwrap();
        let first: Vec<_> = span.clone().collect();
        let second: Vec<_> = span.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }
}
