//! Pipeline orchestrator - drives the output stage once per event.
//!
//! This is the framework side of the contract: it owns scheduling, rotation
//! policy and event generation, and honors the stage's declared execution
//! mode by driving every call from a single task.

use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, instrument};

use contracts::{
    DepositPredicate, EventContext, EventStage, ExecutionMode, OutputBlueprint,
};
use observability::{record_commit_metrics, record_stream_opened};
use output_action::OutputAction;

use super::{MockEventSource, PipelineStats};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The output blueprint
    pub blueprint: OutputBlueprint,

    /// Number of events to produce
    pub events: u64,

    /// Deposit predicate threshold (None = accept all)
    pub min_energy: Option<f64>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    #[instrument(name = "pipeline_run", skip(self))]
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        std::fs::create_dir_all(&blueprint.output.directory).with_context(|| {
            format!(
                "Failed to create output directory {}",
                blueprint.output.directory.display()
            )
        })?;

        // Wire and initialize the output action
        let mut action = OutputAction::new("edm_output", blueprint.clone());
        action.initialize().context("Failed to initialize output action")?;

        // The stage opts out of parallel execution; this driver runs every
        // call from this single task.
        let exclusive = action.execution_mode() == ExecutionMode::Exclusive;

        info!(
            stage = action.name(),
            exclusive,
            collections = action.registry().len(),
            events = self.config.events,
            events_per_file = blueprint.output.events_per_file,
            "Output action ready"
        );

        let predicate = match self.config.min_energy {
            Some(threshold) => DepositPredicate::min_energy(threshold),
            None => DepositPredicate::accept_all(),
        };
        let source = MockEventSource::from_blueprint(blueprint);
        let events_per_file = blueprint.output.events_per_file;
        let run_number = blueprint.run.run_number;

        let mut stats = PipelineStats::default();

        let file = action.open_next().context("Failed to open output stream")?;
        record_stream_opened(&file);
        info!(file = %file, "Output stream opened");

        for event_number in 1..=self.config.events {
            // Rotate once the current file holds events_per_file events
            if events_per_file > 0 && action.events_in_file() >= events_per_file {
                let file = action
                    .open_next()
                    .context("Failed to rotate output stream")?;
                record_stream_opened(&file);
                info!(file = %file, event = event_number, "Rotated output stream");
            }

            let ctx = EventContext {
                run_number,
                event_number,
                time_stamp: chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default(),
            };

            for work in source.event(event_number) {
                action
                    .execute(&ctx, &work, &predicate)
                    .with_context(|| format!("Conversion failed in event {event_number}"))?;
            }

            let summary = action
                .commit_output(&ctx)
                .with_context(|| format!("Commit failed in event {event_number}"))?;

            record_commit_metrics(&summary);
            stats.commit_metrics.update(&summary);
            stats.events_committed += 1;
            stats.entries_written += summary.total_entries as u64;

            // Keep the runtime responsive to the shutdown signal
            tokio::task::yield_now().await;
        }

        action.close_output().context("Failed to close output stream")?;

        stats.files_written = stats.commit_metrics.files_seen;
        stats.duration = start_time.elapsed();

        info!(
            events = stats.events_committed,
            entries = stats.entries_written,
            files = stats.files_written,
            duration_secs = stats.duration.as_secs_f64(),
            "Pipeline complete"
        );

        Ok(stats)
    }
}
