//! Commit metrics collection
//!
//! Records per-commit metrics from `CommitSummary` and aggregates them in
//! memory for the end-of-run summary.

use std::collections::HashMap;

use contracts::CommitSummary;
use metrics::{counter, gauge, histogram};

/// Record metrics from one committed event
///
/// Call once per successful commit.
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_commit_metrics;
///
/// let summary = action.commit_output(&ctx)?;
/// record_commit_metrics(&summary);
/// ```
pub fn record_commit_metrics(summary: &CommitSummary) {
    counter!("digi_writer_events_total").increment(1);
    gauge!("digi_writer_events_in_file").set(summary.events_in_file as f64);
    histogram!("digi_writer_entries_per_event").record(summary.total_entries as f64);

    for (collection, entries) in &summary.entries_per_collection {
        gauge!(
            "digi_writer_collection_entries",
            "collection" => collection.clone()
        )
        .set(*entries as f64);
    }
}

/// Record entries appended by one conversion
pub fn record_entries_appended(collection: &str, added: u64) {
    counter!(
        "digi_writer_entries_appended_total",
        "collection" => collection.to_string()
    )
    .increment(added);
}

/// Record an output stream rotation
pub fn record_stream_opened(file_name: &str) {
    counter!("digi_writer_files_opened_total").increment(1);
    tracing::debug!(file = %file_name, "rotation recorded");
}

/// Commit metrics aggregator
///
/// Aggregates commit summaries in memory for statistics and run summaries.
#[derive(Debug, Clone, Default)]
pub struct CommitAggregator {
    /// Events committed
    pub total_events: u64,

    /// Entries written across all events
    pub total_entries: u64,

    /// Files the run wrote into
    pub files_seen: u64,

    /// Entries per collection name, across the run
    pub collection_totals: HashMap<String, u64>,

    /// Entries-per-event statistics
    pub entry_stats: RunningStats,

    last_file: Option<String>,
}

impl CommitAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one commit summary into the aggregate
    pub fn update(&mut self, summary: &CommitSummary) {
        self.total_events += 1;
        self.total_entries += summary.total_entries as u64;
        self.entry_stats.push(summary.total_entries as f64);

        for (collection, entries) in &summary.entries_per_collection {
            *self.collection_totals.entry(collection.clone()).or_insert(0) += *entries as u64;
        }

        if self.last_file.as_deref() != Some(summary.file_name.as_str()) {
            self.files_seen += 1;
            self.last_file = Some(summary.file_name.clone());
        }
    }

    /// Produce a summary report
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_events: self.total_events,
            total_entries: self.total_entries,
            files_seen: self.files_seen,
            entries_per_event: StatsSummary::from(&self.entry_stats),
            collection_totals: self.collection_totals.clone(),
        }
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Metrics summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_events: u64,
    pub total_entries: u64,
    pub files_seen: u64,
    pub entries_per_event: StatsSummary,
    pub collection_totals: HashMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Commit Metrics Summary ===")?;
        writeln!(f, "Events committed: {}", self.total_events)?;
        writeln!(f, "Entries written: {}", self.total_entries)?;
        writeln!(f, "Output files: {}", self.files_seen)?;
        writeln!(f, "Entries per event: {}", self.entries_per_event)?;

        if !self.collection_totals.is_empty() {
            writeln!(f, "Entries per collection:")?;
            let mut totals: Vec<_> = self.collection_totals.iter().collect();
            totals.sort_by(|a, b| a.0.cmp(b.0));
            for (collection, count) in totals {
                writeln!(f, "  {}: {}", collection, count)?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.2}, std={:.2} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics calculator (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}
