//! Accessors over untrusted JSON.
//!
//! Agent output is produced by language models and only loosely follows its
//! schema. Every accessor here answers "absent" instead of failing, and the
//! typed views in this module tree pick their placeholders from that answer.

use serde_json::Value;

/// Scalar text for `key`. Empty and whitespace-only strings count as absent,
/// as do nulls, objects and arrays.
pub(crate) fn text(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(scalar_text)
}

/// Scalar text of a value on its own.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Display text of any list entry: strings verbatim, everything else as its
/// compact JSON text. Nulls and blank strings yield nothing.
pub(crate) fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// The array at `key`, or an empty slice.
pub(crate) fn list<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Every displayable entry of the array at `key`.
pub(crate) fn text_list(value: &Value, key: &str) -> Vec<String> {
    list(value, key).iter().filter_map(display_text).collect()
}

/// Numeric value for `key`; numeric strings are accepted.
pub(crate) fn number(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Truthiness of `key` the way a loosely typed producer means it.
pub(crate) fn flag(value: &Value, key: &str) -> bool {
    match value.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        Some(Value::Null) | None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_treats_blank_and_structured_values_as_absent() {
        let v = json!({"a": "  ", "b": {"x": 1}, "c": 3, "d": null, "e": "ok"});
        assert_eq!(text(&v, "a"), None);
        assert_eq!(text(&v, "b"), None);
        assert_eq!(text(&v, "c").as_deref(), Some("3"));
        assert_eq!(text(&v, "d"), None);
        assert_eq!(text(&v, "e").as_deref(), Some("ok"));
        assert_eq!(text(&v, "missing"), None);
    }

    #[test]
    fn text_list_serializes_non_strings() {
        let v = json!({"tips": ["walk", {"k": 1}, null, 2]});
        assert_eq!(text_list(&v, "tips"), vec!["walk", r#"{"k":1}"#, "2"]);
    }

    #[test]
    fn list_of_non_array_is_empty() {
        let v = json!({"items": "nope"});
        assert!(list(&v, "items").is_empty());
        assert!(list(&json!(42), "items").is_empty());
    }

    #[test]
    fn number_accepts_numeric_strings() {
        let v = json!({"a": 0, "b": "0.5", "c": "x"});
        assert_eq!(number(&v, "a"), Some(0.0));
        assert_eq!(number(&v, "b"), Some(0.5));
        assert_eq!(number(&v, "c"), None);
    }

    #[test]
    fn flag_follows_truthiness() {
        let v = json!({"t": true, "one": 1, "zero": 0, "s": "", "n": null});
        assert!(flag(&v, "t"));
        assert!(flag(&v, "one"));
        assert!(!flag(&v, "zero"));
        assert!(!flag(&v, "s"));
        assert!(!flag(&v, "n"));
    }
}
