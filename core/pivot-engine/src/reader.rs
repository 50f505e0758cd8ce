//! FILENAME: core/pivot-engine/src/reader.rs
//! Record reader - the single place where record values are coerced.
//!
//! Dimension members, measures and flags are all read through `RecordReader`
//! so the coercion rules live in one spot:
//! - member: the value is first read as the field's declared type
//!   (`coerce`), then keyed with `key::canonicalize`; missing = `""`
//! - measure: finite numbers, or strings that parse to a finite number
//! - flag: only a stored boolean `true` counts
//!
//! Keys the schema doesn't declare are read by the value's own tag.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use pivot_model::{FieldType, FieldValue, RecordEntity, Schema};

use crate::key::{canonicalize, canonicalize_opt, DATE_KEY_FORMAT};

/// Accepted forms for a date stored as text with a time component.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Reads `value` as `field_type`. Values that don't fit the declared type
/// are returned unchanged.
pub fn coerce(value: &FieldValue, field_type: FieldType) -> Cow<'_, FieldValue> {
    let FieldValue::Text(raw) = value else {
        return Cow::Borrowed(value);
    };
    let trimmed = raw.trim();

    let coerced = match field_type {
        FieldType::String => None,
        FieldType::Number => trimmed
            .parse::<f64>()
            .ok()
            .filter(|n| !trimmed.is_empty() && n.is_finite())
            .map(FieldValue::Number),
        FieldType::Boolean => {
            if trimmed.eq_ignore_ascii_case("true") {
                Some(FieldValue::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Some(FieldValue::Bool(false))
            } else {
                None
            }
        }
        FieldType::Date => parse_date(trimmed).map(FieldValue::Date),
    };

    coerced.map_or(Cow::Borrowed(value), Cow::Owned)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_KEY_FORMAT) {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|datetime| datetime.date())
}

/// Numeric contribution of a value, `None` when it does not contribute.
pub fn measure_value(value: &FieldValue) -> Option<f64> {
    let n = match value {
        FieldValue::Number(n) => *n,
        FieldValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// True only for a stored boolean `true`.
pub fn flag_value(value: &FieldValue) -> bool {
    matches!(value, FieldValue::Bool(true))
}

/// Borrowing view over one record, typed by the schema.
#[derive(Debug, Clone, Copy)]
pub struct RecordReader<'a> {
    record: &'a RecordEntity,
    schema: &'a Schema,
}

impl<'a> RecordReader<'a> {
    pub fn new(record: &'a RecordEntity, schema: &'a Schema) -> Self {
        RecordReader { record, schema }
    }

    pub fn member(&self, key: &str) -> String {
        let value = self.record.get(key);
        match (value, self.schema.field(key)) {
            (Some(value), Some(field)) => canonicalize(&coerce(value, field.field_type)),
            _ => canonicalize_opt(value),
        }
    }

    pub fn measure(&self, key: &str) -> Option<f64> {
        self.record.get(key).and_then(measure_value)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.record.get(key).map(flag_value).unwrap_or(false)
    }

    /// True when the record's member for `key` is in `allowed`.
    pub fn member_in<S: AsRef<str>>(&self, key: &str, allowed: &[S]) -> bool {
        let member = self.member(key);
        allowed.iter().any(|a| a.as_ref() == member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pivot_model::FieldDef;

    fn typed_schema() -> Schema {
        Schema::new(vec![
            FieldDef::new("qty", "Qty", FieldType::Number),
            FieldDef::new("paid", "Paid", FieldType::Boolean),
            FieldDef::new("day", "Day", FieldType::Date),
            FieldDef::new("code", "Code", FieldType::String),
        ])
        .unwrap()
    }

    #[test]
    fn test_measure_coercion() {
        assert_eq!(measure_value(&FieldValue::Number(2.0)), Some(2.0));
        assert_eq!(measure_value(&FieldValue::text("3.5")), Some(3.5));
        assert_eq!(measure_value(&FieldValue::text(" 4 ")), Some(4.0));
        assert_eq!(measure_value(&FieldValue::text("")), None);
        assert_eq!(measure_value(&FieldValue::text("abc")), None);
        assert_eq!(measure_value(&FieldValue::text("inf")), None);
        assert_eq!(measure_value(&FieldValue::text("NaN")), None);
        assert_eq!(measure_value(&FieldValue::Number(f64::INFINITY)), None);
        assert_eq!(measure_value(&FieldValue::Bool(true)), None);
        assert_eq!(measure_value(&FieldValue::Blank), None);
    }

    #[test]
    fn test_flag_is_strict() {
        assert!(flag_value(&FieldValue::Bool(true)));
        assert!(!flag_value(&FieldValue::Bool(false)));
        assert!(!flag_value(&FieldValue::text("true")));
        assert!(!flag_value(&FieldValue::Number(1.0)));
    }

    #[test]
    fn test_coerce_to_declared_type() {
        assert_eq!(*coerce(&FieldValue::text(" 5.0 "), FieldType::Number), FieldValue::Number(5.0));
        assert_eq!(*coerce(&FieldValue::text("many"), FieldType::Number), FieldValue::text("many"));
        assert_eq!(*coerce(&FieldValue::text(""), FieldType::Number), FieldValue::text(""));
        assert_eq!(*coerce(&FieldValue::text("TRUE"), FieldType::Boolean), FieldValue::Bool(true));
        assert_eq!(*coerce(&FieldValue::text("07"), FieldType::String), FieldValue::text("07"));
        assert_eq!(*coerce(&FieldValue::Number(7.0), FieldType::String), FieldValue::Number(7.0));

        let day = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        assert_eq!(*coerce(&FieldValue::text("2026-01-02T17:30:00Z"), FieldType::Date), FieldValue::Date(day));
        assert_eq!(*coerce(&FieldValue::text("2026-01-02 08:00:00"), FieldType::Date), FieldValue::Date(day));
        assert_eq!(*coerce(&FieldValue::text("soon"), FieldType::Date), FieldValue::text("soon"));
    }

    #[test]
    fn test_members_follow_declared_type() {
        let schema = typed_schema();
        let record = RecordEntity::new("r")
            .with("qty", "5.0")
            .with("paid", "True")
            .with("day", "2026-01-02T17:30:00Z")
            .with("code", "007")
            .with("other", "5.0");
        let reader = RecordReader::new(&record, &schema);

        assert_eq!(reader.member("qty"), "5");
        assert_eq!(reader.member("paid"), "true");
        assert_eq!(reader.member("day"), "2026-01-02");
        assert_eq!(reader.member("code"), "007");
        // Undeclared keys keep the stored form.
        assert_eq!(reader.member("other"), "5.0");
    }

    #[test]
    fn test_reader_missing_keys() {
        let schema = Schema::default();
        let record = RecordEntity::new("r").with("x", "X1").with("n", 7);
        let reader = RecordReader::new(&record, &schema);

        assert_eq!(reader.member("x"), "X1");
        assert_eq!(reader.member("n"), "7");
        assert_eq!(reader.member("missing"), "");
        assert_eq!(reader.measure("missing"), None);
        assert!(!reader.flag("missing"));
        assert!(reader.member_in("x", &["X0", "X1"]));
        assert!(reader.member_in("missing", &[""]));
        assert!(!reader.member_in("x", &["X2"]));
    }
}
