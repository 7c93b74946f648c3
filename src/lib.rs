//! # Stevedore
//!
//! A bidirectional bulk data-transfer engine.
//!
//! Stevedore serializes collections of persisted records into redacted
//! tabular exports, and deserializes external CSV/JSON input into persisted
//! records with field remapping and partial-failure reporting.
//!
//! ## Features
//!
//! - Paginated CSV export with attribute selection and sensitive-field
//!   redaction (`[FILTERED]`)
//! - CSV and JSON import with header remapping, whitespace canonicalization,
//!   and a per-row accepted/rejected ledger
//! - Optional all-or-nothing transactional import (rollback mode)
//! - Persistence behind a narrow [`EntityStore`] capability trait
//!
//! ## Example
//!
//! ```rust,ignore
//! use stevedore::{ImportOptions, ImportPipeline, MemoryStore, StevedoreConfig};
//!
//! let mut pipeline = ImportPipeline::new(&mut store, "users");
//! let result = pipeline.import_csv(payload, &ImportOptions::default().with_strip(true))?;
//! println!("accepted {} rejected {}", result.accepted.len(), result.rejected.len());
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod mapping;
pub mod models;
pub mod pipeline;
pub mod redact;
pub mod store;

// Re-exports for convenience
pub use config::StevedoreConfig;
pub use mapping::AttributeMap;
pub use models::{FieldMap, Record, RecordId, ValidationErrors, render_value};
pub use pipeline::export::{
    Attachment, ExportArtifact, ExportOptions, ExportPipeline, ExportResult, ExportSource,
};
pub use pipeline::import::{
    AcceptedEntry, ImportOptions, ImportPipeline, ImportResult, RawEntry, RejectedEntry,
};
pub use redact::{FILTERED, RedactionFilter};
pub use store::{EntityStore, FieldSpec, MemoryStore, SaveOutcome, Schema};

/// Error type for stevedore operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `Configuration` | Malformed attribute map, zero batch size, bad config file |
/// | `Parse` | Malformed CSV/JSON payload, before any row is processed |
/// | `RecordInvalid` | A row fails persistence validation in rollback mode |
/// | `Store` | Non-validation persistence failure (unknown type/field, I/O) |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid configuration was provided.
    ///
    /// Raised when:
    /// - An attribute map is built from non-string JSON material
    /// - A batch size of zero is requested
    /// - A config file cannot be read or parsed
    ///
    /// Always fatal, raised before any work begins.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A payload could not be parsed.
    ///
    /// Raised before any entry is processed; nothing is persisted.
    #[error("failed to parse {format} payload: {cause}")]
    Parse {
        /// The payload format ("csv" or "json").
        format: &'static str,
        /// The underlying parser message.
        cause: String,
    },

    /// A record failed persistence validation.
    ///
    /// Only surfaced as an error in rollback mode, where the first invalid
    /// row aborts the whole call. In non-rollback mode validation failures
    /// are captured in the outcome ledger instead.
    #[error("record failed validation: {0}")]
    RecordInvalid(ValidationErrors),

    /// A store operation failed for a non-validation reason.
    ///
    /// Raised when:
    /// - A record type has no declared schema
    /// - A candidate carries a field the schema does not know
    /// - Artifact rendering or other I/O fails
    ///
    /// Always fatal; aborts the current transaction if one is open.
    #[error("store operation '{operation}' failed: {cause}")]
    Store {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for stevedore operations.
pub type Result<T> = std::result::Result<T, Error>;
