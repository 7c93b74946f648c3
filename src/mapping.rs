//! Field remapping and entry normalization.
//!
//! Turns a raw import entry into canonical `field -> value` pairs: external
//! keys are renamed through an [`AttributeMap`] and, when stripping is
//! enabled, keys and string values are trimmed of surrounding whitespace.

use crate::models::FieldMap;
use crate::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// Mapping from external keys to internal field names.
///
/// Unmapped keys pass through unchanged. Keys are compared as plain strings;
/// callers must pre-stringify symbolic keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap(BTreeMap<String, String>);

impl AttributeMap {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds a single rename.
    #[must_use]
    pub fn with(mut self, external: impl Into<String>, internal: impl Into<String>) -> Self {
        self.0.insert(external.into(), internal.into());
        self
    }

    /// Builds a map from a JSON object of `{"external": "internal"}` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the value is not an object or any
    /// value is not a string. A malformed mapping table is a configuration
    /// error, never a per-row error.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            Error::Configuration("attribute map must be a JSON object".to_string())
        })?;

        let mut map = BTreeMap::new();
        for (external, internal) in object {
            let internal = internal.as_str().ok_or_else(|| {
                Error::Configuration(format!(
                    "attribute map value for '{external}' must be a string"
                ))
            })?;
            map.insert(external.clone(), internal.to_string());
        }
        Ok(Self(map))
    }

    /// Resolves an external key to its internal field name.
    #[must_use]
    pub fn resolve<'a>(&'a self, external: &'a str) -> &'a str {
        self.0.get(external).map_or(external, String::as_str)
    }

    /// Returns the number of renames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Normalizes a raw entry into a canonical field map.
///
/// Per key: trim the key when `strip` is set, resolve it through the map
/// (trim first, then map), and trim string values when `strip` is set.
/// Non-string values pass through unmodified. Output key order is
/// insignificant; the destination is a field-name-keyed map.
#[must_use]
pub fn normalize_entry<I>(pairs: I, attribute_map: Option<&AttributeMap>, strip: bool) -> FieldMap
where
    I: IntoIterator<Item = (String, Value)>,
{
    let mut canonical = FieldMap::new();
    for (key, value) in pairs {
        let key = if strip { key.trim().to_string() } else { key };
        let field = attribute_map.map_or(key.as_str(), |m| m.resolve(&key));

        let value = match value {
            Value::String(s) if strip => Value::String(s.trim().to_string()),
            other => other,
        };

        canonical.insert(field.to_string(), value);
    }
    canonical
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(items: &[(&str, Value)]) -> Vec<(String, Value)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_unmapped_keys_pass_through() {
        let canonical = normalize_entry(pairs(&[("email", json!("x@y.com"))]), None, false);
        assert_eq!(canonical.get("email"), Some(&json!("x@y.com")));
    }

    #[test]
    fn test_rename_through_map() {
        let map = AttributeMap::new()
            .with("email_address", "email")
            .with("passcode", "password");

        let canonical = normalize_entry(
            pairs(&[
                ("email_address", json!("x@y.com")),
                ("passcode", json!("s3krit")),
                ("age", json!(30)),
            ]),
            Some(&map),
            false,
        );

        assert_eq!(canonical.get("email"), Some(&json!("x@y.com")));
        assert_eq!(canonical.get("password"), Some(&json!("s3krit")));
        assert_eq!(canonical.get("age"), Some(&json!(30)));
        assert!(!canonical.contains_key("email_address"));
    }

    #[test]
    fn test_strip_trims_key_then_maps() {
        let map = AttributeMap::new().with("email_address", "email");

        let canonical = normalize_entry(
            pairs(&[(" email_address ", json!(" x@y.com "))]),
            Some(&map),
            true,
        );

        assert_eq!(canonical.get("email"), Some(&json!("x@y.com")));
    }

    #[test]
    fn test_strip_leaves_non_strings_alone() {
        let canonical = normalize_entry(
            pairs(&[("age", json!(30)), ("active", json!(true)), ("note", Value::Null)]),
            None,
            true,
        );

        assert_eq!(canonical.get("age"), Some(&json!(30)));
        assert_eq!(canonical.get("active"), Some(&json!(true)));
        assert_eq!(canonical.get("note"), Some(&Value::Null));
    }

    #[test]
    fn test_no_strip_preserves_whitespace() {
        let canonical = normalize_entry(pairs(&[(" email ", json!(" x "))]), None, false);
        assert_eq!(canonical.get(" email "), Some(&json!(" x ")));
    }

    #[test]
    fn test_from_json_valid() {
        let map = AttributeMap::from_json(&json!({"email_address": "email"})).unwrap();
        assert_eq!(map.resolve("email_address"), "email");
        assert_eq!(map.resolve("other"), "other");
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let err = AttributeMap::from_json(&json!(["email"]));
        assert!(matches!(err, Err(crate::Error::Configuration(_))));
    }

    #[test]
    fn test_from_json_rejects_non_string_values() {
        let err = AttributeMap::from_json(&json!({"email_address": 1}));
        assert!(matches!(err, Err(crate::Error::Configuration(_))));
    }
}
