//! JSON Schema validation for stored time-series payloads.
//!
//! Records fetched from the data-set API carry their payload as free-form
//! JSON. Before it is deserialized into a [`crate::models::TabularPayload`]
//! it is checked against the embedded draft 7 schema
//! `schemas/time-series-payload.json`, so callers get one message per
//! offending field rather than the first serde error.
//!
//! Shape rules the schema cannot express (index column among the columns,
//! row widths) live in [`crate::models::TabularPayload::check_shape`].
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use dataset_series::validation::{is_valid_time_series_payload, validate_time_series_payload};
//!
//! let payload = json!({
//!     "columns": ["t", "a"],
//!     "indexColumn": "t",
//!     "data": [["0", "1"], [""]],
//!     "dateFormat": "%Y",
//!     "columnMapping": { "a": "Sensor A" }
//! });
//! assert!(is_valid_time_series_payload(&payload));
//!
//! let broken = json!({ "columns": "t,a" });
//! assert!(validate_time_series_payload(&broken).is_err());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

static TIME_SERIES_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/time-series-payload.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON value against a JSON schema.
///
/// # Returns
/// * `Ok(())` when valid
/// * `Err(Vec<String>)` with one message per violation
///
/// # Example
/// ```
/// use serde_json::json;
/// use dataset_series::validation::validate;
///
/// let schema = json!({
///     "type": "object",
///     "required": ["name"],
///     "properties": {
///         "name": { "type": "string" }
///     }
/// });
///
/// assert!(validate(&schema, &json!({ "name": "test" })).is_ok());
/// assert!(validate(&schema, &json!({ "age": 42 })).is_err());
/// ```
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Same as [`validate`], without the messages.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate against the time-series payload schema.
pub fn validate_time_series_payload(data: &Value) -> Result<(), Vec<String>> {
    validate(&TIME_SERIES_SCHEMA, data)
}

/// Quick check against the time-series payload schema.
pub fn is_valid_time_series_payload(data: &Value) -> bool {
    is_valid(&TIME_SERIES_SCHEMA, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_payload() {
        let payload = json!({
            "columns": ["time", "a"],
            "indexColumn": "time",
            "data": [["2024-01-01", "1.5"], [""]],
            "dateFormat": "%Y-%m-%d",
            "columnMapping": { "a": "Sensor A", "time": null }
        });
        assert!(is_valid_time_series_payload(&payload));
    }

    #[test]
    fn test_nulls_allowed() {
        let payload = json!({
            "columns": null,
            "indexColumn": null,
            "data": null,
            "dateFormat": null,
            "columnMapping": null
        });
        assert!(is_valid_time_series_payload(&payload));
        assert!(is_valid_time_series_payload(&json!({})));
    }

    #[test]
    fn test_invalid_cells() {
        let payload = json!({
            "columns": ["t", "a"],
            "data": [["0", 1], []]
        });
        let errors = validate_time_series_payload(&payload).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_duplicate_columns() {
        let payload = json!({ "columns": ["t", "t"] });
        assert!(!is_valid_time_series_payload(&payload));
    }

    #[test]
    fn test_dangling_escape_rejected() {
        assert!(!is_valid_time_series_payload(&json!({ "dateFormat": "%Y-%" })));
        assert!(is_valid_time_series_payload(&json!({ "dateFormat": "%Y-%m" })));
    }

    #[test]
    fn test_not_an_object() {
        assert!(validate_time_series_payload(&json!([1, 2])).is_err());
    }
}
