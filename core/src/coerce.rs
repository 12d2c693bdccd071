//! Coercion of loosely typed response values.
//!
//! The service sends almost every scalar as a string (`"7"`, `"12.50"`,
//! `"1"`). Each base coercion accepts both the string form and the native
//! JSON form. The `nullable_*` variants map an absent or `null` value to
//! `None` without ever running the base coercion on it.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::error::CoerceError;

/// Apply `f` to a present, non-null value; absent or `null` yields `None`.
pub fn nullable<T, E, F>(value: Option<&Value>, f: F) -> Result<Option<T>, E>
where
    F: FnOnce(&Value) -> Result<T, E>,
{
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => f(value).map(Some),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{s:?}"),
        other => other.to_string(),
    }
}

/// Base-10 integer.
pub fn int(value: &Value) -> Result<i64, CoerceError> {
    match value {
        Value::String(s) => s.trim().parse().map_err(|_| CoerceError::Int(describe(value))),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| whole_in_range(*f)).map(|f| f as i64))
            .ok_or_else(|| CoerceError::Int(describe(value))),
        _ => Err(CoerceError::Int(describe(value))),
    }
}

// `i64::MAX as f64` rounds up to 2^63, hence the strict upper bound.
fn whole_in_range(f: f64) -> bool {
    f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

pub fn float(value: &Value) -> Result<f64, CoerceError> {
    match value {
        Value::String(s) => s.trim().parse().map_err(|_| CoerceError::Float(describe(value))),
        Value::Number(n) => n.as_f64().ok_or_else(|| CoerceError::Float(describe(value))),
        _ => Err(CoerceError::Float(describe(value))),
    }
}

/// Strings pass through; numbers are rendered in their JSON form.
pub fn string(value: &Value) -> Result<String, CoerceError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(CoerceError::Str(describe(value))),
    }
}

/// The service's flag convention: only the string `"1"` is true. Everything
/// else, including native JSON `true`, `1` and an absent value, is false.
pub fn flag(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if s == "1")
}

fn flag_value(value: &Value) -> Result<bool, CoerceError> {
    Ok(flag(Some(value)))
}

/// Calendar date or timestamp. Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`,
/// the same with a `T` separator, and RFC 3339 (normalized to UTC). Date-only
/// input yields midnight.
pub fn date(value: &Value) -> Result<NaiveDateTime, CoerceError> {
    let Value::String(raw) = value else {
        return Err(CoerceError::Date(describe(value)));
    };
    let raw = raw.trim();

    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(stamp.naive_utc());
    }
    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Ok(stamp);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|day| day.and_time(chrono::NaiveTime::MIN))
        .map_err(|_| CoerceError::Date(describe(value)))
}

/// Decode a JSON-encoded string field. Values that already arrived as
/// structured JSON are returned as-is.
pub fn json(value: &Value) -> Result<Value, CoerceError> {
    match value {
        Value::String(raw) => serde_json::from_str(raw).map_err(|e| CoerceError::Json(e.to_string())),
        other => Ok(other.clone()),
    }
}

pub fn nullable_int(value: Option<&Value>) -> Result<Option<i64>, CoerceError> {
    nullable(value, int)
}

pub fn nullable_float(value: Option<&Value>) -> Result<Option<f64>, CoerceError> {
    nullable(value, float)
}

pub fn nullable_string(value: Option<&Value>) -> Result<Option<String>, CoerceError> {
    nullable(value, string)
}

pub fn nullable_date(value: Option<&Value>) -> Result<Option<NaiveDateTime>, CoerceError> {
    nullable(value, date)
}

pub fn nullable_bool(value: Option<&Value>) -> Result<Option<bool>, CoerceError> {
    nullable(value, flag_value)
}

pub fn nullable_json(value: Option<&Value>) -> Result<Option<Value>, CoerceError> {
    nullable(value, json)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use serde_json::json;

    use super::*;

    #[test]
    fn nullable_never_calls_f_on_missing_values() {
        let calls = Cell::new(0);
        let f = |_: &Value| -> Result<(), CoerceError> {
            calls.set(calls.get() + 1);
            Ok(())
        };
        assert_eq!(nullable(None, f), Ok(None));
        assert_eq!(nullable(Some(&Value::Null), f), Ok(None));
        assert_eq!(calls.get(), 0);
        assert_eq!(nullable(Some(&json!("x")), f), Ok(Some(())));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn nullable_int_cases() {
        assert_eq!(nullable_int(None), Ok(None));
        assert_eq!(nullable_int(Some(&Value::Null)), Ok(None));
        assert_eq!(nullable_int(Some(&json!("42"))), Ok(Some(42)));
        assert_eq!(nullable_int(Some(&json!(42))), Ok(Some(42)));
    }

    #[test]
    fn nullable_bool_cases() {
        assert_eq!(nullable_bool(Some(&json!("1"))), Ok(Some(true)));
        assert_eq!(nullable_bool(Some(&json!("0"))), Ok(Some(false)));
        assert_eq!(nullable_bool(None), Ok(None));
    }

    #[test]
    fn flag_is_not_a_truthy_check() {
        assert!(flag(Some(&json!("1"))));
        assert!(!flag(Some(&json!("2"))));
        assert!(!flag(Some(&json!("true"))));
        assert!(!flag(Some(&json!("yes"))));
        assert!(!flag(Some(&json!(true))));
        assert!(!flag(Some(&json!(1))));
        assert!(!flag(None));
        assert_eq!(nullable_bool(Some(&json!(true))), Ok(Some(false)));
    }

    #[test]
    fn int_rejects_garbage() {
        assert_eq!(int(&json!("abc")), Err(CoerceError::Int("\"abc\"".to_string())));
        assert!(int(&json!("12.5")).is_err());
        assert!(int(&json!(true)).is_err());
        assert_eq!(int(&json!(" 7 ")), Ok(7));
        assert_eq!(int(&json!(-3)), Ok(-3));
    }

    #[test]
    fn int_rejects_out_of_range_numbers() {
        assert!(matches!(int(&json!(1e20)), Err(CoerceError::Int(_))));
        assert!(matches!(int(&json!(-1e30)), Err(CoerceError::Int(_))));
        assert!(int(&json!(9.3e18)).is_err());
        assert_eq!(int(&json!(4.0)), Ok(4));
        assert_eq!(int(&json!(-9.0e18)), Ok(-9_000_000_000_000_000_000));
    }

    #[test]
    fn float_accepts_strings_and_numbers() {
        assert_eq!(float(&json!("12.50")), Ok(12.5));
        assert_eq!(float(&json!(3)), Ok(3.0));
        assert!(float(&json!("twelve")).is_err());
    }

    #[test]
    fn string_renders_numbers() {
        assert_eq!(string(&json!("abc")), Ok("abc".to_string()));
        assert_eq!(string(&json!(15)), Ok("15".to_string()));
        assert!(string(&json!({"a": 1})).is_err());
    }

    #[test]
    fn date_formats() {
        let midnight = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(date(&json!("2023-01-15")), Ok(midnight));

        let stamp = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap().and_hms_opt(10, 20, 30).unwrap();
        assert_eq!(date(&json!("2023-01-15 10:20:30")), Ok(stamp));
        assert_eq!(date(&json!("2023-01-15T10:20:30")), Ok(stamp));
        assert_eq!(date(&json!("2023-01-15T12:20:30+02:00")), Ok(stamp));
    }

    #[test]
    fn invalid_date_propagates() {
        assert!(matches!(date(&json!("not a date")), Err(CoerceError::Date(_))));
        assert!(matches!(nullable_date(Some(&json!("2023-13-45"))), Err(CoerceError::Date(_))));
        assert_eq!(nullable_date(None), Ok(None));
    }

    #[test]
    fn json_decodes_embedded_strings() {
        assert_eq!(json(&json!(r#"{"a":"b"}"#)), Ok(json!({"a": "b"})));
        assert_eq!(json(&json!({"a": "b"})), Ok(json!({"a": "b"})));
        assert!(matches!(json(&json!("{oops")), Err(CoerceError::Json(_))));
        assert_eq!(nullable_json(Some(&Value::Null)), Ok(None));
    }
}
