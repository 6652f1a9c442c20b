//! Type-aware value helpers shared by the resolver and eligibility calculator.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value as JsonValue;

use crate::models::FieldType;

/// Date layouts accepted by the `date` fill test, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%d-%b-%Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Canonical string form of a raw value, used to compare candidates.
///
/// Strings are trimmed, numbers and booleans stringified, arrays and objects
/// JSON-serialized. `null` and blank strings have no canonical form.
pub fn canonical_string(value: &JsonValue) -> Option<String> {
    let s = match value {
        JsonValue::Null => return None,
        JsonValue::String(s) => s.trim().to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => canonical_number(n),
        JsonValue::Array(_) | JsonValue::Object(_) => value.to_string(),
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Integral floats print without a fractional part, so `1.0` and `1` compare equal.
fn canonical_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < MAX_SAFE_INTEGER => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Whether `s` parses as a finite number.
pub fn parses_as_finite_number(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && s.parse::<f64>().map(f64::is_finite).unwrap_or(false)
}

/// Whether `s` parses as a calendar date or timestamp.
pub fn parses_as_date(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() {
        return false;
    }
    if DateTime::parse_from_rfc3339(s).is_ok() || DateTime::parse_from_rfc2822(s).is_ok() {
        return true;
    }
    DATETIME_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(s, fmt).is_ok())
        || DATE_FORMATS
            .iter()
            .any(|fmt| NaiveDate::parse_from_str(s, fmt).is_ok())
}

/// Type-aware "is this value actually filled" test.
///
/// Falsy-but-meaningful values count: boolean `false` fills a boolean field
/// and `0` fills a number field.
pub fn is_filled_by_type(field_type: FieldType, value: &JsonValue) -> bool {
    match field_type {
        FieldType::Boolean => value.is_boolean(),
        FieldType::Number => match value {
            JsonValue::Number(n) => n.as_f64().is_some_and(f64::is_finite),
            JsonValue::String(s) => parses_as_finite_number(s),
            _ => false,
        },
        FieldType::Date => match value {
            JsonValue::String(s) => parses_as_date(s),
            _ => false,
        },
        FieldType::Array => value.as_array().is_some_and(|a| !a.is_empty()),
        FieldType::Object => value.as_object().is_some_and(|o| !o.is_empty()),
        FieldType::String => match value {
            JsonValue::Null => false,
            JsonValue::String(s) => !s.trim().is_empty(),
            JsonValue::Array(a) => !a.is_empty(),
            JsonValue::Object(o) => !o.is_empty(),
            JsonValue::Bool(_) | JsonValue::Number(_) => true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_string_scalars() {
        assert_eq!(canonical_string(&json!("  Ayesha Khan ")), Some("Ayesha Khan".to_string()));
        assert_eq!(canonical_string(&json!(42)), Some("42".to_string()));
        assert_eq!(canonical_string(&json!(false)), Some("false".to_string()));
        assert_eq!(canonical_string(&json!(null)), None);
        assert_eq!(canonical_string(&json!("   ")), None);
    }

    #[test]
    fn test_canonical_string_integral_floats() {
        assert_eq!(canonical_string(&json!(1.0)), Some("1".to_string()));
        assert_eq!(canonical_string(&json!(-0.0)), Some("0".to_string()));
        assert_eq!(canonical_string(&json!(2500000.0)), canonical_string(&json!(2500000)));
        assert_eq!(canonical_string(&json!(2.5)), Some("2.5".to_string()));
        assert_eq!(canonical_string(&json!(1.0)), canonical_string(&json!("1")));
    }

    #[test]
    fn test_canonical_string_structures() {
        assert_eq!(canonical_string(&json!([1, 2])), Some("[1,2]".to_string()));
        assert_eq!(
            canonical_string(&json!({"city": "Lahore"})),
            Some(r#"{"city":"Lahore"}"#.to_string())
        );
    }

    #[test]
    fn test_boolean_false_is_filled() {
        assert!(is_filled_by_type(FieldType::Boolean, &json!(false)));
        assert!(is_filled_by_type(FieldType::Boolean, &json!(true)));
        assert!(!is_filled_by_type(FieldType::Boolean, &json!("false")));
        assert!(!is_filled_by_type(FieldType::Boolean, &json!(null)));
    }

    #[test]
    fn test_number_zero_is_filled() {
        assert!(is_filled_by_type(FieldType::Number, &json!(0)));
        assert!(is_filled_by_type(FieldType::Number, &json!(2.5)));
        assert!(is_filled_by_type(FieldType::Number, &json!(" 1500000 ")));
        assert!(!is_filled_by_type(FieldType::Number, &json!("")));
        assert!(!is_filled_by_type(FieldType::Number, &json!("n/a")));
        assert!(!is_filled_by_type(FieldType::Number, &json!("inf")));
        assert!(!is_filled_by_type(FieldType::Number, &json!(true)));
    }

    #[test]
    fn test_date_strings() {
        assert!(is_filled_by_type(FieldType::Date, &json!("2024-03-15")));
        assert!(is_filled_by_type(FieldType::Date, &json!("2024-03-15T10:00:00Z")));
        assert!(is_filled_by_type(FieldType::Date, &json!("03/15/2024")));
        assert!(is_filled_by_type(FieldType::Date, &json!("15.03.2024")));
        assert!(is_filled_by_type(FieldType::Date, &json!("March 15, 2024")));
        assert!(is_filled_by_type(FieldType::Date, &json!("15 Mar 2024")));
        assert!(!is_filled_by_type(FieldType::Date, &json!("someday")));
        assert!(!is_filled_by_type(FieldType::Date, &json!("2024-13-45")));
        assert!(!is_filled_by_type(FieldType::Date, &json!(20240315)));
    }

    #[test]
    fn test_array_and_object() {
        assert!(is_filled_by_type(FieldType::Array, &json!(["a"])));
        assert!(!is_filled_by_type(FieldType::Array, &json!([])));
        assert!(!is_filled_by_type(FieldType::Array, &json!({"a": 1})));
        assert!(is_filled_by_type(FieldType::Object, &json!({"a": 1})));
        assert!(!is_filled_by_type(FieldType::Object, &json!({})));
        assert!(!is_filled_by_type(FieldType::Object, &json!([1])));
    }

    #[test]
    fn test_string_default() {
        assert!(is_filled_by_type(FieldType::String, &json!("x")));
        assert!(!is_filled_by_type(FieldType::String, &json!("  ")));
        assert!(is_filled_by_type(FieldType::String, &json!(0)));
        assert!(is_filled_by_type(FieldType::String, &json!(false)));
        assert!(!is_filled_by_type(FieldType::String, &json!([])));
        assert!(!is_filled_by_type(FieldType::String, &json!(null)));
    }
}
