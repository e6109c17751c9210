//! Pipeline statistics and metrics.

use std::time::Duration;

use observability::CommitAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Events committed to disk
    pub events_committed: u64,

    /// Entries written across all events
    pub entries_written: u64,

    /// Output files produced
    pub files_written: u64,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Commit metrics aggregator
    pub commit_metrics: CommitAggregator,
}

impl PipelineStats {
    /// Calculate events per second throughput
    pub fn eps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.events_committed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Pipeline Statistics ===");
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
        println!("Events committed: {}", self.events_committed);
        println!("Entries written: {}", self.entries_written);
        println!("Output files: {}", self.files_written);
        println!("Events/s: {:.2}", self.eps());
        println!();
        println!("{}", self.commit_metrics.summary());
    }
}
