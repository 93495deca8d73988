//! Validation helpers for configuration documents.

use serde_json::Value;

use crate::defaults::REQUIRED_KEYS;
use crate::error::{ConfigError, ConfigResult};

/// Check that every required key is present with a non-empty value.
///
/// Empty strings, arrays, objects and `null` count as missing. All missing
/// keys are reported together.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] naming each missing key.
pub fn validate(doc: &Value) -> ConfigResult<()> {
    let missing: Vec<&'static str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| doc.get(key).is_none_or(is_blank))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation { missing })
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete() -> Value {
        json!({
            "authToken": "token",
            "fallbackAddress": ["proxy.example"],
            "regionMapping": { "HK": "Hong Kong" }
        })
    }

    #[test]
    fn accepts_complete_document() {
        assert!(validate(&complete()).is_ok());
    }

    #[test]
    fn reports_all_missing_keys() {
        let Err(ConfigError::Validation { missing }) = validate(&json!({})) else {
            panic!("expected validation failure");
        };
        assert_eq!(missing, vec!["authToken", "fallbackAddress", "regionMapping"]);
    }

    #[test]
    fn empty_values_count_as_missing() {
        let mut doc = complete();
        doc["authToken"] = json!("");
        doc["regionMapping"] = json!({});
        let Err(ConfigError::Validation { missing }) = validate(&doc) else {
            panic!("expected validation failure");
        };
        assert_eq!(missing, vec!["authToken", "regionMapping"]);
    }

    #[test]
    fn non_object_documents_fail_every_key() {
        let Err(ConfigError::Validation { missing }) = validate(&json!([1, 2, 3])) else {
            panic!("expected validation failure");
        };
        assert_eq!(missing.len(), 3);
    }
}
