//! Data models for stevedore.
//!
//! This module contains the core data structures shared by both pipelines.

mod record;
mod validation;

pub use record::{FieldMap, Record, RecordId, render_value};
pub use validation::ValidationErrors;
