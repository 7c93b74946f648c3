//! Export and import pipelines.
//!
//! Each pipeline is a single synchronous pass: export pages records out of an
//! [`crate::store::EntityStore`] into tabular artifacts, import feeds parsed
//! entries back into one.

pub mod export;
pub mod import;

pub use export::{Attachment, ExportArtifact, ExportOptions, ExportPipeline, ExportResult, ExportSource};
pub use import::{AcceptedEntry, ImportOptions, ImportPipeline, ImportResult, RawEntry, RejectedEntry};
