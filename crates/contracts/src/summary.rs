//! CommitSummary - per-commit accounting
//!
//! Returned by every successful commit; consumed by metrics recording and
//! the run-summary aggregator.

use std::collections::HashMap;

use serde::Serialize;

/// What one committed event record contained
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommitSummary {
    /// File the event was written to
    pub file_name: String,

    /// Events committed to this file so far, including this one
    pub events_in_file: u64,

    /// Entries across all collections in this event
    pub total_entries: usize,

    /// Entries per collection name in this event
    pub entries_per_collection: HashMap<String, usize>,
}
