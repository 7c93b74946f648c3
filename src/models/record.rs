//! Record types and identifiers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Named fields of a record or import candidate.
pub type FieldMap = BTreeMap<String, Value>;

/// Unique identifier for a persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a record ID from an existing value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A persisted entity instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier.
    pub id: RecordId,
    /// The record type this record belongs to (e.g. "users").
    pub record_type: String,
    /// Named field values, including the `id` field.
    pub fields: FieldMap,
}

impl Record {
    /// Reads a field value, treating absent fields as null.
    #[must_use]
    pub fn field(&self, name: &str) -> &Value {
        self.fields.get(name).unwrap_or(&Value::Null)
    }
}

/// Renders a field value for tabular output.
///
/// Null (the native "missing/unset" value) renders as an empty string, not a
/// literal "null". Strings render verbatim; any other JSON value renders as
/// its JSON text.
#[must_use]
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_id_generate_is_unique() {
        assert_ne!(RecordId::generate(), RecordId::generate());
    }

    #[test]
    fn test_record_field_missing_is_null() {
        let record = Record {
            id: RecordId::new("1"),
            record_type: "users".to_string(),
            fields: FieldMap::new(),
        };
        assert_eq!(record.field("email"), &Value::Null);
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&Value::Null), "");
        assert_eq!(render_value(&json!("x@y.com")), "x@y.com");
        assert_eq!(render_value(&json!(42)), "42");
        assert_eq!(render_value(&json!(true)), "true");
        assert_eq!(render_value(&json!(["a", "b"])), "[\"a\",\"b\"]");
    }
}
