//! Static file module
//!
//! Reads the configured files and derives the per-file summaries.

pub mod catalog;
pub mod summary;

pub use catalog::{FileCatalog, FileEntry};
pub use summary::{display_value, Summary, SummaryRules};
