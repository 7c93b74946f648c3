//! Record export pipeline.
//!
//! Paginates a record collection, projects each record to a filtered and
//! redacted ordered field list, and assembles one CSV artifact per batch.

use crate::config::StevedoreConfig;
use crate::models::{Record, render_value};
use crate::redact::RedactionFilter;
use crate::store::EntityStore;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

/// What to export: one record or a whole collection.
///
/// Resolved once at pipeline entry; a single record behaves exactly like a
/// one-element collection.
#[derive(Debug, Clone)]
pub enum ExportSource {
    /// A single record.
    Single(Record),
    /// Every persisted record of a type, paged out of the store.
    Collection(String),
}

impl ExportSource {
    /// Returns the record type this source draws from.
    #[must_use]
    pub fn record_type(&self) -> &str {
        match self {
            Self::Single(record) => &record.record_type,
            Self::Collection(record_type) => record_type,
        }
    }
}

/// Options for record export.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Render sensitive values verbatim instead of masking them.
    pub export_sensitive_data: bool,
    /// Attribute allowlist; empty means every native field.
    pub attributes: Vec<String>,
    /// Records per artifact; falls back to the configured default.
    pub batch_size: Option<usize>,
}

impl ExportOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables exporting sensitive data unmasked.
    #[must_use]
    pub const fn with_sensitive_data(mut self) -> Self {
        self.export_sensitive_data = true;
        self
    }

    /// Restricts the export to an attribute allowlist.
    ///
    /// Allowlist order is preserved in the output; names the record type does
    /// not have are silently dropped.
    #[must_use]
    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the batch size for this call.
    #[must_use]
    pub const fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }
}

/// One complete tabular export output, analogous to one file.
#[derive(Debug, Clone, Serialize)]
pub struct ExportArtifact {
    /// Header row: the field set of this export call.
    pub headers: Vec<String>,
    /// Data rows in record iteration order.
    pub rows: Vec<Vec<String>>,
}

impl ExportArtifact {
    /// Renders the artifact as CSV bytes, header row first.
    ///
    /// # Errors
    ///
    /// Returns an error if CSV serialization fails.
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(&self.headers)
            .map_err(|e| write_error(e.to_string()))?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|e| write_error(e.to_string()))?;
        }
        writer
            .into_inner()
            .map_err(|e| write_error(e.to_string()))
    }
}

fn write_error(cause: String) -> Error {
    Error::Store {
        operation: "write_csv".to_string(),
        cause,
    }
}

/// An addressable in-memory artifact ready for a transport layer.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Deterministic file name.
    pub file_name: String,
    /// CSV content.
    pub content: Vec<u8>,
}

/// Ordered artifact list produced by one export call.
#[derive(Debug, Clone, Serialize)]
pub struct ExportResult {
    /// The record type that was exported.
    pub record_type: String,
    /// One artifact per non-empty page, in source order.
    pub artifacts: Vec<ExportArtifact>,
}

impl ExportResult {
    /// Returns whether anything was exported.
    #[must_use]
    pub fn has_artifacts(&self) -> bool {
        !self.artifacts.is_empty()
    }

    /// Returns the total number of exported rows across artifacts.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.artifacts.iter().map(|a| a.rows.len()).sum()
    }

    /// Renders every artifact into a named attachment.
    ///
    /// File names follow
    /// `<record_type>-export-YYYY-MM-DD-HH-MM-SS-UTC[-<n>].csv`; the 1-based
    /// index suffix appears only when more than one artifact exists. All
    /// attachments from one call share the `at` timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if CSV rendering fails.
    pub fn attachments(&self, at: DateTime<Utc>) -> Result<Vec<Attachment>> {
        let stamp = at.format("%Y-%m-%d-%H-%M-%S-UTC");
        let indexed = self.artifacts.len() > 1;

        self.artifacts
            .iter()
            .enumerate()
            .map(|(i, artifact)| {
                let suffix = if indexed {
                    format!("-{}", i + 1)
                } else {
                    String::new()
                };
                Ok(Attachment {
                    file_name: format!(
                        "{}-export-{stamp}{suffix}.csv",
                        self.record_type.to_lowercase()
                    ),
                    content: artifact.to_csv()?,
                })
            })
            .collect()
    }
}

/// Pipeline for exporting records to tabular artifacts.
pub struct ExportPipeline<'a, S: EntityStore> {
    store: &'a S,
    config: &'a StevedoreConfig,
}

impl<'a, S: EntityStore> ExportPipeline<'a, S> {
    /// Creates a new export pipeline.
    #[must_use]
    pub const fn new(store: &'a S, config: &'a StevedoreConfig) -> Self {
        Self { store, config }
    }

    /// Exports a source into one artifact per batch.
    ///
    /// Configuration (sensitive markers, default batch size) is snapshotted
    /// once at the start of the call. Paging is lossless and
    /// order-preserving: concatenating all artifacts' rows reproduces the
    /// source order exactly, and an empty collection yields zero artifacts.
    ///
    /// # Errors
    ///
    /// Returns an error if the record type is unknown or the effective batch
    /// size is zero.
    pub fn export(&self, source: ExportSource, options: &ExportOptions) -> Result<ExportResult> {
        let record_type = source.record_type().to_string();
        let native = self.store.field_names(&record_type)?;
        let field_set = resolve_field_set(&options.attributes, &native);

        let batch_size = options
            .batch_size
            .unwrap_or(self.config.default_batch_size);
        if batch_size == 0 {
            return Err(Error::Configuration(
                "batch size must be greater than zero".to_string(),
            ));
        }

        let markers = self.config.sensitive_markers.clone();
        let filter = RedactionFilter::new(&markers, options.export_sensitive_data);

        let mut artifacts = Vec::new();
        match source {
            ExportSource::Single(record) => {
                artifacts.push(build_artifact(&field_set, &[record], &filter));
            },
            ExportSource::Collection(_) => {
                let mut offset = 0;
                loop {
                    let page = self.store.fetch_page(&record_type, offset, batch_size)?;
                    if page.is_empty() {
                        break;
                    }
                    offset += page.len();
                    tracing::debug!(%record_type, offset, rows = page.len(), "export page");
                    artifacts.push(build_artifact(&field_set, &page, &filter));
                }
            },
        }

        tracing::info!(
            %record_type,
            artifacts = artifacts.len(),
            fields = field_set.len(),
            "export complete"
        );
        Ok(ExportResult {
            record_type,
            artifacts,
        })
    }
}

/// Resolves the field set for one export call.
///
/// A non-empty allowlist is intersected with the native field list while
/// preserving allowlist order; duplicates are dropped (first occurrence
/// wins). An empty allowlist selects the full native list in store order.
fn resolve_field_set(allowlist: &[String], native: &[String]) -> Vec<String> {
    if allowlist.is_empty() {
        return native.to_vec();
    }

    let mut seen = BTreeSet::new();
    allowlist
        .iter()
        .filter(|name| native.contains(name))
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}

fn build_artifact(
    field_set: &[String],
    records: &[Record],
    filter: &RedactionFilter<'_>,
) -> ExportArtifact {
    let rows = records
        .iter()
        .map(|record| {
            field_set
                .iter()
                .map(|field| render_value(&filter.apply(field, record.field(field))))
                .collect()
        })
        .collect();

    ExportArtifact {
        headers: field_set.to_vec(),
        rows,
    }
}
