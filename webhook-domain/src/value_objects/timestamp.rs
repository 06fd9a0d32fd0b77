// Unix timestamp parsing for event payloads

use serde_json::Value;

/// Reads a Unix-seconds value from a JSON field. Integers and numeric strings
/// are accepted equivalently; floats are truncated toward zero. Anything else
/// is unparseable.
pub fn parse_unix_seconds(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Whether a payload field counts as supplied. Null, zero, empty strings and
/// empty containers are treated as absent.
pub fn is_supplied(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Text form of the timestamp as it takes part in the signing string.
pub fn signing_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "0".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_integers_and_numeric_strings() {
        assert_eq!(parse_unix_seconds(&json!(1_700_000_000)), Some(1_700_000_000));
        assert_eq!(parse_unix_seconds(&json!("1700000000")), Some(1_700_000_000));
        assert_eq!(parse_unix_seconds(&json!(" 42 ")), Some(42));
        assert_eq!(parse_unix_seconds(&json!(12.9)), Some(12));
    }

    #[test]
    fn rejects_non_numeric_values() {
        assert_eq!(parse_unix_seconds(&json!("not_a_number")), None);
        assert_eq!(parse_unix_seconds(&json!("1.5")), None);
        assert_eq!(parse_unix_seconds(&Value::Null), None);
        assert_eq!(parse_unix_seconds(&json!({"ts": 1})), None);
    }

    #[test]
    fn zero_and_empty_are_not_supplied() {
        assert!(!is_supplied(&json!(0)));
        assert!(!is_supplied(&json!("")));
        assert!(!is_supplied(&Value::Null));
        assert!(is_supplied(&json!("abc")));
        assert!(is_supplied(&json!(1_700_000_000)));
    }

    #[test]
    fn signing_text_keeps_payload_representation() {
        assert_eq!(signing_text(Some(&json!(1_700_000_000))), "1700000000");
        assert_eq!(signing_text(Some(&json!("1700000000"))), "1700000000");
        assert_eq!(signing_text(None), "0");
    }
}
