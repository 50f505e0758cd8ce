//! FILENAME: core/pivot-engine/src/key.rs
//! Key Codec - canonical string keys for dimension members.
//!
//! Every dimension key derivation in the engine goes through `canonicalize`.
//! It is total: any `FieldValue` maps to a string, blanks map to `""`.
//!
//! Members are ordered with `compare_members`, a case-insensitive collation
//! with a lowercase-first tie-break that falls back to code point order, so
//! distinct strings never compare equal.

use std::cmp::Ordering;

use pivot_model::FieldValue;

/// Date format used for canonical date keys.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Converts a raw field value into its stable string key.
pub fn canonicalize(value: &FieldValue) -> String {
    match value {
        FieldValue::Blank => String::new(),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Number(n) => number_key(*n),
        FieldValue::Text(s) => s.clone(),
        FieldValue::Date(d) => d.format(DATE_KEY_FORMAT).to_string(),
        FieldValue::DateTime(dt) => dt.date().format(DATE_KEY_FORMAT).to_string(),
    }
}

/// Canonical key for an optional value; a missing key is blank.
pub fn canonicalize_opt(value: Option<&FieldValue>) -> String {
    value.map(canonicalize).unwrap_or_default()
}

/// Shortest round-trip decimal form, with exponent notation outside
/// `[1e-6, 1e21)` and no negative zero.
fn number_key(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let abs = n.abs();
    if abs >= 1e21 || abs < 1e-6 {
        let formatted = format!("{:e}", n);
        match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        }
    } else {
        format!("{}", n)
    }
}

/// Orders two canonical member keys.
pub fn compare_members(a: &str, b: &str) -> Ordering {
    let folded_a = a.chars().flat_map(char::to_lowercase);
    let folded_b = b.chars().flat_map(char::to_lowercase);

    folded_a
        .cmp(folded_b)
        .then_with(|| {
            let case_a = a.chars().map(char::is_uppercase);
            let case_b = b.chars().map(char::is_uppercase);
            case_a.cmp(case_b)
        })
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_blank_values() {
        assert_eq!(canonicalize(&FieldValue::Blank), "");
        assert_eq!(canonicalize(&FieldValue::text("")), "");
        assert_eq!(canonicalize_opt(None), "");
    }

    #[test]
    fn test_scalars() {
        assert_eq!(canonicalize(&FieldValue::Number(5.0)), "5");
        assert_eq!(canonicalize(&FieldValue::Number(2.5)), "2.5");
        assert_eq!(canonicalize(&FieldValue::Number(-0.0)), "0");
        assert_eq!(canonicalize(&FieldValue::Number(1e21)), "1e+21");
        assert_eq!(canonicalize(&FieldValue::Number(1e-7)), "1e-7");
        assert_eq!(canonicalize(&FieldValue::Number(f64::NAN)), "NaN");
        assert_eq!(canonicalize(&FieldValue::Bool(true)), "true");
        assert_eq!(canonicalize(&FieldValue::Bool(false)), "false");
        assert_eq!(canonicalize(&FieldValue::text("North")), "North");
    }

    #[test]
    fn test_dates() {
        assert_eq!(canonicalize(&FieldValue::text("2026-01-01")), "2026-01-01");

        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(canonicalize(&FieldValue::Date(date)), "2026-03-09");

        let datetime = date.and_hms_opt(23, 59, 1).unwrap();
        assert_eq!(canonicalize(&FieldValue::DateTime(datetime)), "2026-03-09");
    }

    #[test]
    fn test_member_ordering() {
        assert_eq!(compare_members("", "a"), Ordering::Less);
        assert_eq!(compare_members("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_members("a", "A"), Ordering::Less);
        assert_eq!(compare_members("X1", "X2"), Ordering::Less);
        assert_eq!(compare_members("10", "9"), Ordering::Less);
        assert_eq!(compare_members("2026-01-02", "2026-01-10"), Ordering::Less);
        assert_eq!(compare_members("same", "same"), Ordering::Equal);
    }
}
