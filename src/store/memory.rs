//! In-memory entity store.
//!
//! Reference [`EntityStore`] backend with declared schemas, presence
//! validation, and snapshot-based transactions. Used by the test suite and
//! as a template for real backends.

use super::traits::{EntityStore, SaveOutcome};
use crate::models::{FieldMap, Record, RecordId, ValidationErrors};
use crate::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// Declared field of a record type.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Field name.
    pub name: String,
    /// Whether a blank value fails validation.
    pub required: bool,
}

impl FieldSpec {
    /// Declares a required field.
    #[must_use]
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
        }
    }

    /// Declares an optional field.
    #[must_use]
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
        }
    }
}

/// Schema of a record type.
///
/// The `id` field is implicit: the store prepends it to the native field
/// list and assigns it on save.
#[derive(Debug, Clone)]
pub struct Schema {
    /// The record type name (e.g. "users").
    pub record_type: String,
    /// Declared fields, in native order.
    pub fields: Vec<FieldSpec>,
}

impl Schema {
    /// Creates a schema for a record type.
    #[must_use]
    pub fn new(record_type: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            record_type: record_type.into(),
            fields,
        }
    }
}

/// In-memory entity store with per-type insertion-ordered collections.
#[derive(Debug, Default)]
pub struct MemoryStore {
    schemas: BTreeMap<String, Schema>,
    records: BTreeMap<String, Vec<Record>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a record type.
    pub fn define(&mut self, schema: Schema) {
        self.records.entry(schema.record_type.clone()).or_default();
        self.schemas.insert(schema.record_type.clone(), schema);
    }

    fn schema(&self, record_type: &str) -> Result<&Schema> {
        self.schemas.get(record_type).ok_or_else(|| Error::Store {
            operation: "lookup_schema".to_string(),
            cause: format!("unknown record type '{record_type}'"),
        })
    }

    /// Validates a candidate against a schema.
    ///
    /// Required fields that are absent, null, or blank after trimming
    /// collect "can't be blank".
    fn validate(schema: &Schema, candidate: &FieldMap) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for spec in &schema.fields {
            if !spec.required {
                continue;
            }
            let blank = match candidate.get(&spec.name) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(_) => false,
            };
            if blank {
                errors.add(&spec.name, "can't be blank");
            }
        }
        errors
    }

    /// Rejects candidate fields the schema does not declare.
    ///
    /// Assigning an unknown attribute is a store failure, not a validation
    /// failure, mirroring how a relational backend would refuse the column.
    fn check_known_fields(schema: &Schema, candidate: &FieldMap) -> Result<()> {
        for key in candidate.keys() {
            if !schema.fields.iter().any(|spec| spec.name == *key) {
                return Err(Error::Store {
                    operation: "new_record".to_string(),
                    cause: format!(
                        "unknown field '{key}' for record type '{}'",
                        schema.record_type
                    ),
                });
            }
        }
        Ok(())
    }
}

impl EntityStore for MemoryStore {
    fn field_names(&self, record_type: &str) -> Result<Vec<String>> {
        let schema = self.schema(record_type)?;
        let mut names = Vec::with_capacity(schema.fields.len() + 1);
        names.push("id".to_string());
        names.extend(schema.fields.iter().map(|spec| spec.name.clone()));
        Ok(names)
    }

    fn count(&self, record_type: &str) -> Result<usize> {
        self.schema(record_type)?;
        Ok(self.records.get(record_type).map_or(0, Vec::len))
    }

    fn fetch_page(&self, record_type: &str, offset: usize, limit: usize) -> Result<Vec<Record>> {
        self.schema(record_type)?;
        let all = self.records.get(record_type).map_or(&[][..], Vec::as_slice);
        Ok(all.iter().skip(offset).take(limit).cloned().collect())
    }

    fn save(&mut self, record_type: &str, candidate: &FieldMap) -> Result<SaveOutcome> {
        let schema = self.schema(record_type)?;
        Self::check_known_fields(schema, candidate)?;

        let errors = Self::validate(schema, candidate);
        if !errors.is_empty() {
            tracing::debug!(record_type, %errors, "candidate rejected");
            return Ok(SaveOutcome::Invalid(errors));
        }

        let id = RecordId::generate();
        let mut fields = candidate.clone();
        fields.insert("id".to_string(), Value::String(id.to_string()));

        self.records
            .entry(record_type.to_string())
            .or_default()
            .push(Record {
                id: id.clone(),
                record_type: record_type.to_string(),
                fields,
            });

        Ok(SaveOutcome::Saved(id))
    }

    fn with_transaction<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let snapshot = self.records.clone();
        match f(self) {
            Ok(value) => Ok(value),
            Err(e) => {
                self.records = snapshot;
                Err(e)
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.define(Schema::new(
            "users",
            vec![FieldSpec::required("email"), FieldSpec::required("password")],
        ));
        store
    }

    fn user(email: &str, password: &str) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert("email".to_string(), json!(email));
        fields.insert("password".to_string(), json!(password));
        fields
    }

    #[test]
    fn test_field_names_prepend_id() {
        let store = users_store();
        assert_eq!(store.field_names("users").unwrap(), ["id", "email", "password"]);
    }

    #[test]
    fn test_unknown_record_type() {
        let store = users_store();
        assert!(matches!(
            store.field_names("ghosts"),
            Err(Error::Store { .. })
        ));
    }

    #[test]
    fn test_save_assigns_id() {
        let mut store = users_store();
        let outcome = store.save("users", &user("x@y.com", "s3krit")).unwrap();

        let SaveOutcome::Saved(id) = outcome else {
            unreachable!("expected a saved outcome");
        };
        assert_eq!(store.count("users").unwrap(), 1);

        let page = store.fetch_page("users", 0, 10).unwrap();
        assert_eq!(page[0].id, id);
        assert_eq!(page[0].field("id"), &json!(id.as_str()));
        assert_eq!(page[0].field("email"), &json!("x@y.com"));
    }

    #[test]
    fn test_blank_required_field_is_invalid() {
        let mut store = users_store();

        for candidate in [user("x@y.com", ""), user("x@y.com", "   ")] {
            let outcome = store.save("users", &candidate).unwrap();
            let SaveOutcome::Invalid(errors) = outcome else {
                unreachable!("expected an invalid outcome");
            };
            assert_eq!(errors.get("password"), Some(&["can't be blank".to_string()][..]));
        }

        let outcome = store.save("users", &FieldMap::new()).unwrap();
        let SaveOutcome::Invalid(errors) = outcome else {
            unreachable!("expected an invalid outcome");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(store.count("users").unwrap(), 0);
    }

    #[test]
    fn test_null_value_is_blank() {
        let mut store = users_store();
        let mut candidate = user("x@y.com", "s3krit");
        candidate.insert("password".to_string(), Value::Null);

        let outcome = store.save("users", &candidate).unwrap();
        assert!(matches!(outcome, SaveOutcome::Invalid(_)));
    }

    #[test]
    fn test_unknown_field_is_store_error() {
        let mut store = users_store();
        let mut candidate = user("x@y.com", "s3krit");
        candidate.insert("shoe_size".to_string(), json!(42));

        assert!(matches!(
            store.save("users", &candidate),
            Err(Error::Store { .. })
        ));
    }

    #[test]
    fn test_paging_is_stable_and_ordered() {
        let mut store = users_store();
        for i in 0..5 {
            store
                .save("users", &user(&format!("u{i}@y.com"), "pw"))
                .unwrap();
        }

        let first = store.fetch_page("users", 0, 2).unwrap();
        let second = store.fetch_page("users", 2, 2).unwrap();
        let third = store.fetch_page("users", 4, 2).unwrap();
        let past_end = store.fetch_page("users", 6, 2).unwrap();

        let emails: Vec<String> = first
            .iter()
            .chain(&second)
            .chain(&third)
            .map(|r| r.field("email").as_str().unwrap_or_default().to_string())
            .collect();
        assert_eq!(
            emails,
            ["u0@y.com", "u1@y.com", "u2@y.com", "u3@y.com", "u4@y.com"]
        );
        assert!(past_end.is_empty());
    }

    #[test]
    fn test_transaction_commits_on_success() {
        let mut store = users_store();
        store
            .with_transaction(|s| {
                s.save_or_fail("users", &user("a@y.com", "pw"))?;
                s.save_or_fail("users", &user("b@y.com", "pw"))?;
                Ok(())
            })
            .unwrap();

        assert_eq!(store.count("users").unwrap(), 2);
    }

    #[test]
    fn test_transaction_rolls_back_on_failure() {
        let mut store = users_store();
        store.save("users", &user("kept@y.com", "pw")).unwrap();

        let result: Result<()> = store.with_transaction(|s| {
            s.save_or_fail("users", &user("a@y.com", "pw"))?;
            s.save_or_fail("users", &user("invalid@y.com", ""))?;
            Ok(())
        });

        assert!(matches!(result, Err(Error::RecordInvalid(_))));
        assert_eq!(store.count("users").unwrap(), 1);
        let page = store.fetch_page("users", 0, 10).unwrap();
        assert_eq!(page[0].field("email"), &json!("kept@y.com"));
    }

    #[test]
    fn test_save_or_fail_returns_id() {
        let mut store = users_store();
        let id = store.save_or_fail("users", &user("x@y.com", "pw")).unwrap();
        assert!(!id.as_str().is_empty());
    }
}
