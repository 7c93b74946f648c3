//! Record import pipeline.
//!
//! Parses a CSV or JSON payload into entries, normalizes each entry through
//! the field mapper, persists it through the entity store, and accumulates a
//! per-row outcome ledger. Rollback mode wraps the whole loop in one atomic
//! transaction.

use crate::mapping::{AttributeMap, normalize_entry};
use crate::models::{RecordId, ValidationErrors};
use crate::store::{EntityStore, SaveOutcome};
use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;

/// Options for record import.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Renames applied to external keys before persistence.
    pub attribute_map: Option<AttributeMap>,
    /// Explicit CSV header list; when set, every payload line is data.
    pub headers: Option<Vec<String>>,
    /// Trim surrounding whitespace from keys and string values.
    pub strip: bool,
    /// All-or-nothing transactional mode.
    pub rollback: bool,
}

impl ImportOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the attribute map.
    #[must_use]
    pub fn with_attribute_map(mut self, map: AttributeMap) -> Self {
        self.attribute_map = Some(map);
        self
    }

    /// Supplies CSV headers explicitly instead of reading the first line.
    #[must_use]
    pub fn with_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = Some(headers.into_iter().map(Into::into).collect());
        self
    }

    /// Enables or disables whitespace stripping.
    #[must_use]
    pub const fn with_strip(mut self, strip: bool) -> Self {
        self.strip = strip;
        self
    }

    /// Enables or disables rollback mode.
    #[must_use]
    pub const fn with_rollback(mut self, rollback: bool) -> Self {
        self.rollback = rollback;
        self
    }
}

/// An entry exactly as received, before any mapping or stripping.
///
/// Kept in the ledger for traceability.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawEntry {
    /// CSV cell values in column order, padded to the header length.
    Row(Vec<Value>),
    /// A JSON object in its received key order.
    Object(serde_json::Map<String, Value>),
}

/// A persisted entry and its assigned identifier.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptedEntry {
    /// The entry as received.
    pub row: RawEntry,
    /// The identifier assigned by the store.
    pub id: RecordId,
}

/// An entry that failed persistence validation.
#[derive(Debug, Clone, Serialize)]
pub struct RejectedEntry {
    /// The entry as received.
    pub row: RawEntry,
    /// Per-field validation messages.
    pub errors: ValidationErrors,
}

/// Outcome ledger of one import call.
///
/// Outcomes appear in input order; in non-rollback mode every input entry
/// lands in exactly one of the two lists.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportResult {
    /// Entries persisted successfully.
    pub accepted: Vec<AcceptedEntry>,
    /// Entries rejected by validation.
    pub rejected: Vec<RejectedEntry>,
}

impl ImportResult {
    /// Returns the total number of entries accounted for.
    #[must_use]
    pub fn total(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }

    /// Returns whether any entry was rejected.
    #[must_use]
    pub fn has_rejections(&self) -> bool {
        !self.rejected.is_empty()
    }
}

/// A parsed entry: the pre-mapping snapshot plus its key/value pairs.
struct Entry {
    raw: RawEntry,
    pairs: Vec<(String, Value)>,
}

/// Pipeline for importing external payloads into an entity store.
///
/// Import is strictly create-only; identifying and updating existing records
/// is out of scope.
pub struct ImportPipeline<'a, S: EntityStore> {
    store: &'a mut S,
    record_type: String,
}

impl<'a, S: EntityStore> ImportPipeline<'a, S> {
    /// Creates a new import pipeline for a record type.
    #[must_use]
    pub fn new(store: &'a mut S, record_type: impl Into<String>) -> Self {
        Self {
            store,
            record_type: record_type.into(),
        }
    }

    /// Imports a CSV payload.
    ///
    /// The header row comes from the first payload line unless
    /// [`ImportOptions::headers`] supplies one, in which case every line is
    /// data. Headers apply positionally; short rows pad with null.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for a malformed payload (before any row is
    /// processed) and [`Error::RecordInvalid`] when rollback mode hits an
    /// invalid row.
    pub fn import_csv(&mut self, payload: &str, options: &ImportOptions) -> Result<ImportResult> {
        let entries = parse_csv(payload, options.headers.as_deref())?;
        self.process(entries, options)
    }

    /// Imports a JSON payload: a top-level array of flat objects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed JSON or a non-array/non-object
    /// shape, and [`Error::RecordInvalid`] when rollback mode hits an
    /// invalid row.
    pub fn import_json(&mut self, payload: &str, options: &ImportOptions) -> Result<ImportResult> {
        let entries = parse_json(payload)?;
        self.process(entries, options)
    }

    /// Shared entry loop, strictly in input order.
    fn process(&mut self, entries: Vec<Entry>, options: &ImportOptions) -> Result<ImportResult> {
        let total = entries.len();
        let result = if options.rollback {
            let record_type = self.record_type.clone();
            self.store.with_transaction(move |store| {
                let mut result = ImportResult::default();
                for entry in entries {
                    let candidate =
                        normalize_entry(entry.pairs, options.attribute_map.as_ref(), options.strip);
                    let id = store.save_or_fail(&record_type, &candidate)?;
                    result.accepted.push(AcceptedEntry { row: entry.raw, id });
                }
                Ok(result)
            })?
        } else {
            let mut result = ImportResult::default();
            for entry in entries {
                let candidate =
                    normalize_entry(entry.pairs, options.attribute_map.as_ref(), options.strip);
                match self.store.save(&self.record_type, &candidate)? {
                    SaveOutcome::Saved(id) => {
                        result.accepted.push(AcceptedEntry { row: entry.raw, id });
                    },
                    SaveOutcome::Invalid(errors) => {
                        result.rejected.push(RejectedEntry {
                            row: entry.raw,
                            errors,
                        });
                    },
                }
            }
            result
        };

        tracing::info!(
            record_type = %self.record_type,
            total,
            accepted = result.accepted.len(),
            rejected = result.rejected.len(),
            rollback = options.rollback,
            "import complete"
        );
        Ok(result)
    }
}

/// Parses the whole CSV payload up front; a parse failure is a hard input
/// error raised before any row is processed.
fn parse_csv(payload: &str, headers: Option<&[String]>) -> Result<Vec<Entry>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(payload.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record.map_err(|e| Error::Parse {
            format: "csv",
            cause: e.to_string(),
        })?);
    }

    let mut records = records.into_iter();
    let header: Vec<String> = match headers {
        Some(given) => given.to_vec(),
        None => match records.next() {
            Some(first) => first.iter().map(String::from).collect(),
            None => return Ok(Vec::new()),
        },
    };

    Ok(records
        .map(|record| {
            // The raw snapshot keeps every received cell, even past the
            // header; only header-covered cells become candidate pairs.
            let cells: Vec<Value> = (0..header.len().max(record.len()))
                .map(|i| {
                    record
                        .get(i)
                        .map_or(Value::Null, |cell| Value::String(cell.to_string()))
                })
                .collect();
            let pairs = header.iter().cloned().zip(cells.iter().cloned()).collect();
            Entry {
                raw: RawEntry::Row(cells),
                pairs,
            }
        })
        .collect())
}

/// Parses a JSON payload: a top-level array of flat objects.
fn parse_json(payload: &str) -> Result<Vec<Entry>> {
    let value: Value = serde_json::from_str(payload).map_err(|e| Error::Parse {
        format: "json",
        cause: e.to_string(),
    })?;

    let Value::Array(items) = value else {
        return Err(Error::Parse {
            format: "json",
            cause: "top level must be an array of objects".to_string(),
        });
    };

    items
        .into_iter()
        .map(|item| {
            let Value::Object(object) = item else {
                return Err(Error::Parse {
                    format: "json",
                    cause: "every array element must be an object".to_string(),
                });
            };
            let pairs = object.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            Ok(Entry {
                raw: RawEntry::Object(object),
                pairs,
            })
        })
        .collect()
}
