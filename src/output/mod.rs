//! Output module for run reports
//!
//! This module handles:
//! - Formatting the human-readable summary of an indexing run
//! - Listing documents collected during a dry run

pub mod summary;

pub use summary::{format_documents, format_summary, print_summary};
