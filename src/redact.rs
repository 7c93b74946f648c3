//! Sensitive-field redaction.
//!
//! Masks values of fields whose names look sensitive before they reach an
//! export artifact.

use serde_json::Value;

/// The redaction sentinel written in place of sensitive values.
pub const FILTERED: &str = "[FILTERED]";

/// Decides per field whether an exported value must be masked.
///
/// A field is sensitive when its raw name contains any configured marker as
/// a case-sensitive substring; "passw" matches "password" and
/// "password_digest" alike. Substring matching is deliberate and must not be
/// tightened to exact-token matching.
#[derive(Debug, Clone, Copy)]
pub struct RedactionFilter<'a> {
    markers: &'a [String],
    export_sensitive: bool,
}

impl<'a> RedactionFilter<'a> {
    /// Creates a filter over a marker snapshot.
    ///
    /// When `export_sensitive` is true every value passes through unchanged.
    #[must_use]
    pub const fn new(markers: &'a [String], export_sensitive: bool) -> Self {
        Self {
            markers,
            export_sensitive,
        }
    }

    /// Returns whether a field name matches any marker.
    #[must_use]
    pub fn is_sensitive(&self, field_name: &str) -> bool {
        self.markers.iter().any(|m| field_name.contains(m.as_str()))
    }

    /// Applies redaction to a single field value.
    ///
    /// Pure and per-field: partial redaction within a row is expected.
    /// Unknown or absent fields simply pass through.
    #[must_use]
    pub fn apply(&self, field_name: &str, value: &Value) -> Value {
        if !self.export_sensitive && self.is_sensitive(field_name) {
            Value::String(FILTERED.to_string())
        } else {
            value.clone()
        }
    }
}
