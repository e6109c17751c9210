//! `run` command implementation.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref dir) = args.output_dir {
        info!(directory = %dir.display(), "Overriding output directory from CLI");
        blueprint.output.directory = dir.clone();
    }

    let events = if args.events > 0 {
        args.events
    } else {
        blueprint.run.events
    };
    if events == 0 {
        anyhow::bail!("No event count configured; set run.events or pass --events");
    }

    info!(
        run_number = blueprint.run.run_number,
        events,
        collections = blueprint.collections.len(),
        format = ?blueprint.output.format,
        events_per_file = blueprint.output.events_per_file,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        blueprint,
        events,
        min_energy: args.min_energy,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    // Create and run pipeline
    let pipeline = Pipeline::new(pipeline_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting pipeline...");

    // Run pipeline with shutdown signal
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        events = stats.events_committed,
                        entries = stats.entries_written,
                        files = stats.files_written,
                        duration_secs = stats.duration.as_secs_f64(),
                        eps = format!("{:.2}", stats.eps()),
                        "Pipeline completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Pipeline execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    info!("Digi Writer finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::OutputBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Run:");
    println!("  Run number: {}", blueprint.run.run_number);
    println!("  Events: {}", blueprint.run.events);

    println!("\nOutput:");
    println!("  Directory: {}", blueprint.output.directory.display());
    println!("  Stem: {}", blueprint.output.stem);
    println!("  Format: {:?}", blueprint.output.format);
    if blueprint.output.events_per_file > 0 {
        println!("  Rotation: every {} events", blueprint.output.events_per_file);
    } else {
        println!("  Rotation: disabled");
    }

    println!("\nCollections ({}):", blueprint.collections.len());
    for desc in &blueprint.collections {
        println!("  - {} ({:?})", desc.name, desc.kind);
    }

    println!("\nProcessor:");
    println!(
        "  Point resolution r-phi/z: {} / {} mm",
        blueprint.processor.point_resolution_r_phi, blueprint.processor.point_resolution_z
    );
    println!("  Hit type: {}", blueprint.processor.hit_type);

    if !blueprint.processors.is_empty() {
        println!("\nSub-processors ({}):", blueprint.processors.len());
        for decl in &blueprint.processors {
            println!("  - {} ({})", decl.name, decl.kind);
        }
    }

    println!();
}
