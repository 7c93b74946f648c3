//! Persistence layer.
//!
//! The pipelines never talk to a concrete database; they consume the
//! [`EntityStore`] capability trait. [`MemoryStore`] is the bundled
//! reference backend.

mod memory;
mod traits;

pub use memory::{FieldSpec, MemoryStore, Schema};
pub use traits::{EntityStore, SaveOutcome};
