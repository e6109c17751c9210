//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    run: RunInfo,
    output: OutputInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    collections: Vec<CollectionInfo>,
    processor: ProcessorInfo,
}

#[derive(Serialize)]
struct RunInfo {
    run_number: i32,
    events: u64,
}

#[derive(Serialize)]
struct OutputInfo {
    directory: String,
    stem: String,
    format: String,
    events_per_file: u64,
}

#[derive(Serialize)]
struct CollectionInfo {
    name: String,
    kind: String,
}

#[derive(Serialize)]
struct ProcessorInfo {
    point_resolution_r_phi: f64,
    point_resolution_z: f64,
    hit_type: i32,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &contracts::OutputBlueprint, args: &InfoArgs) -> ConfigInfo {
    let collections = if args.collections {
        blueprint
            .collections
            .iter()
            .map(|c| CollectionInfo {
                name: c.name.clone(),
                kind: format!("{:?}", c.kind),
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        run: RunInfo {
            run_number: blueprint.run.run_number,
            events: blueprint.run.events,
        },
        output: OutputInfo {
            directory: blueprint.output.directory.display().to_string(),
            stem: blueprint.output.stem.clone(),
            format: format!("{:?}", blueprint.output.format),
            events_per_file: blueprint.output.events_per_file,
        },
        collections,
        processor: ProcessorInfo {
            point_resolution_r_phi: blueprint.processor.point_resolution_r_phi,
            point_resolution_z: blueprint.processor.point_resolution_z,
            hit_type: blueprint.processor.hit_type,
        },
    }
}

fn print_config_info(blueprint: &contracts::OutputBlueprint, args: &InfoArgs) {
    println!("=== Digi Writer Configuration ===\n");

    println!("Run:");
    println!("  Version: {:?}", blueprint.version);
    println!("  Run number: {}", blueprint.run.run_number);
    println!("  Events: {}", blueprint.run.events);

    println!("\nOutput:");
    println!("  Directory: {}", blueprint.output.directory.display());
    println!("  Stem: {}", blueprint.output.stem);
    println!("  Format: {:?}", blueprint.output.format);
    if blueprint.output.events_per_file > 0 {
        println!(
            "  Rotation: every {} events",
            blueprint.output.events_per_file
        );
    } else {
        println!("  Rotation: disabled");
    }

    if args.collections {
        println!("\nCollections ({}):", blueprint.collections.len());
        for desc in &blueprint.collections {
            println!("  - {} ({:?})", desc.name, desc.kind);
        }
    } else {
        println!("\nCollections: {}", blueprint.collections.len());
    }

    println!("\nProcessor:");
    println!(
        "  Point resolution r-phi: {} mm",
        blueprint.processor.point_resolution_r_phi
    );
    println!(
        "  Point resolution z: {} mm",
        blueprint.processor.point_resolution_z
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
