//! Complete Pipeline Demo
//!
//! Demonstrates reading a single configuration file, creating the output
//! collections, converting generated records and committing events to a
//! rotating file sequence.
//!
//! Run with: cargo run --bin complete_pipeline [config_path]

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{
    CollectionKind, DepositPredicate, DepositVector, EnergyDeposit, EventContext, InputRecord,
    Particle, ParticleMapping, SegmentKey, SegmentKind, Vector3, WorkItem,
};
use observability::CommitAggregator;
use output_action::OutputAction;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Complete Pipeline Demo");

    let config_path = resolve_config_path();
    info!(path = %config_path.display(), "Loading configuration file");
    let blueprint = ConfigLoader::load_from_path(config_path.as_path())?;
    info!(run = blueprint.run.run_number, "Blueprint loaded");

    std::fs::create_dir_all(&blueprint.output.directory)
        .context("Failed to create output directory")?;

    // ==== Stage 1: Wire and initialize the output action ====
    let run_number = blueprint.run.run_number;
    let events = if blueprint.run.events > 0 {
        blueprint.run.events
    } else {
        10
    };
    let events_per_file = blueprint.output.events_per_file;
    let deposit_targets: Vec<(String, CollectionKind)> = blueprint
        .collections
        .iter()
        .filter(|c| {
            matches!(
                c.kind,
                CollectionKind::TrackerHits | CollectionKind::CalorimeterHits
            )
        })
        .map(|c| (c.name.clone(), c.kind))
        .collect();
    let particle_target = blueprint
        .collections
        .iter()
        .find(|c| c.kind == CollectionKind::Particles)
        .map(|c| c.name.clone());

    let mut action = OutputAction::new("edm_output", blueprint);
    action.initialize()?;

    // ==== Stage 2: Open the first output stream ====
    let file = action.open_next()?;
    info!(file = %file, "Output stream opened");

    // ==== Stage 3: Convert and commit events ====
    let predicate = DepositPredicate::min_energy(0.1);
    let mut aggregator = CommitAggregator::new();

    for event_number in 1..=events {
        if events_per_file > 0 && action.events_in_file() >= events_per_file {
            let file = action.open_next()?;
            info!(file = %file, "Rotated output stream");
        }

        let ctx = EventContext {
            run_number,
            event_number,
            time_stamp: 0,
        };

        for work in generate_event(event_number, particle_target.as_deref(), &deposit_targets) {
            action.execute(&ctx, &work, &predicate)?;
        }

        let summary = action.commit_output(&ctx)?;
        aggregator.update(&summary);
    }

    // ==== Stage 4: Graceful shutdown ====
    info!("Shutting down...");
    action.close_output()?;

    println!("{}", aggregator.summary());
    Ok(())
}

fn resolve_config_path() -> PathBuf {
    std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// Generate the work items of one event
fn generate_event(
    event_number: u64,
    particle_target: Option<&str>,
    deposit_targets: &[(String, CollectionKind)],
) -> Vec<WorkItem> {
    let mut items = Vec::new();
    let mut segment_id = 0u32;

    if let Some(name) = particle_target {
        let mut particles = BTreeMap::new();
        for i in 0..3u64 {
            particles.insert(
                event_number * 10 + i,
                Particle {
                    pdg_id: 13,
                    generator_status: 1,
                    charge: -1.0,
                    mass: 0.105_66,
                    time: 0.0,
                    vertex: Vector3::default(),
                    momentum: Vector3 {
                        x: i as f64,
                        y: 0.0,
                        z: 5.0,
                    },
                },
            );
        }
        items.push(WorkItem {
            segment_id,
            record: InputRecord::Particles(ParticleMapping {
                name: name.to_string(),
                key: SegmentKey::new(0x0001, 0),
                particles,
            }),
        });
        segment_id += 1;
    }

    for (idx, (name, kind)) in deposit_targets.iter().enumerate() {
        let data_type = match kind {
            CollectionKind::CalorimeterHits => SegmentKind::CalorimeterHits,
            _ => SegmentKind::TrackerHits,
        };
        let deposits = (0..5u64)
            .map(|i| {
                (
                    event_number * 100 + i,
                    EnergyDeposit {
                        energy: 0.05 + 0.1 * i as f64,
                        time: 0.2 * i as f64,
                        position: Vector3 {
                            x: i as f64,
                            y: idx as f64,
                            z: event_number as f64,
                        },
                    },
                )
            })
            .collect();
        items.push(WorkItem {
            segment_id,
            record: InputRecord::DepositVec(DepositVector {
                name: name.clone(),
                key: SegmentKey::new(0x0100 + idx as u16, 0),
                data_type,
                deposits,
            }),
        });
        segment_id += 1;
    }

    items
}
