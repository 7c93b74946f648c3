//! Persistence capability trait.
//!
//! The pipelines consume persistence through this narrow interface: stable
//! ordered enumeration, named fields, create-with-validation, and an atomic
//! apply-or-discard transaction boundary.

use crate::models::{FieldMap, Record, RecordId, ValidationErrors};
use crate::{Error, Result};

/// Outcome of attempting to save a candidate record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The record was persisted and assigned an identifier.
    Saved(RecordId),
    /// The record failed validation; nothing was persisted.
    Invalid(ValidationErrors),
}

/// Trait for entity store backends.
///
/// Implementations are the authoritative source of truth for records. The
/// engine issues one transaction boundary per rollback-mode import call,
/// never finer-grained; `with_transaction` must therefore support an
/// arbitrary number of saves inside one atomic unit.
///
/// # Implementor Notes
///
/// - `fetch_page` must enumerate in a stable order so that consecutive pages
///   reproduce the collection exactly
/// - `save` reports validation failures as data (`SaveOutcome::Invalid`),
///   reserving `Err` for non-validation store failures
pub trait EntityStore {
    /// Returns the native field names of a record type, in store-defined order.
    ///
    /// # Errors
    ///
    /// Returns an error if the record type is unknown.
    fn field_names(&self, record_type: &str) -> Result<Vec<String>>;

    /// Returns the number of persisted records of a type.
    ///
    /// # Errors
    ///
    /// Returns an error if the record type is unknown.
    fn count(&self, record_type: &str) -> Result<usize>;

    /// Fetches one page of records in stable enumeration order.
    ///
    /// Returns an empty page at or past the end of the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the record type is unknown.
    fn fetch_page(&self, record_type: &str, offset: usize, limit: usize) -> Result<Vec<Record>>;

    /// Constructs and attempts to save a candidate record.
    ///
    /// # Errors
    ///
    /// Returns an error for non-validation failures (unknown record type,
    /// unknown field). Validation failures are reported via
    /// [`SaveOutcome::Invalid`].
    fn save(&mut self, record_type: &str, candidate: &FieldMap) -> Result<SaveOutcome>;

    /// Like [`EntityStore::save`], but escalates validation failure to an error.
    ///
    /// Used by rollback-mode imports, where a single invalid record must
    /// abort the surrounding transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordInvalid`] on validation failure, plus anything
    /// `save` returns.
    fn save_or_fail(&mut self, record_type: &str, candidate: &FieldMap) -> Result<RecordId> {
        match self.save(record_type, candidate)? {
            SaveOutcome::Saved(id) => Ok(id),
            SaveOutcome::Invalid(errors) => Err(Error::RecordInvalid(errors)),
        }
    }

    /// Runs `f` inside one atomic unit.
    ///
    /// If `f` returns `Err`, every save performed inside the unit is
    /// discarded and the store returns to its pre-call state.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `f`.
    fn with_transaction<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T>
    where
        Self: Sized;
}
