//! # Integration Tests
//!
//! End-to-end tests for the output stage.
//!
//! Covers:
//! - Collection lifecycle invariants (exactly-once creation, commit-clears,
//!   rotation identity)
//! - Conversion contracts (predicate filtering, covariance, fatal paths)
//! - Output file shape for both persistence backends

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod lifecycle_tests {
    use std::collections::BTreeMap;

    use contracts::{
        CollectionDescriptor, CollectionKind, ConfigVersion, ContractError, DepositMapping,
        DepositPredicate, EventContext, InputRecord, OutputBlueprint, OutputConfig,
        ProcessorConfig, ProcessorDecl, RunConfig, SegmentKey, SegmentKind, WorkItem,
        WriterFormat,
    };
    use output_action::OutputAction;

    fn blueprint(dir: &std::path::Path, format: WriterFormat) -> OutputBlueprint {
        OutputBlueprint {
            version: ConfigVersion::V1,
            run: RunConfig {
                run_number: 11,
                events: 0,
            },
            output: OutputConfig {
                directory: dir.to_path_buf(),
                stem: "digi".into(),
                format,
                events_per_file: 0,
            },
            collections: vec![
                CollectionDescriptor::new("MCParticles", CollectionKind::Particles),
                CollectionDescriptor::new("VertexHits", CollectionKind::TrackerHits),
                CollectionDescriptor::new("EcalHits", CollectionKind::CalorimeterHits),
            ],
            processor: ProcessorConfig {
                point_resolution_r_phi: 2.0,
                point_resolution_z: 5.0,
                hit_type: 1,
            },
            processors: vec![ProcessorDecl {
                name: "edm_output.0".into(),
                kind: "output_converter".into(),
            }],
        }
    }

    fn ctx(event: u64) -> EventContext {
        EventContext {
            run_number: 11,
            event_number: event,
            time_stamp: 1_700_000_000_000_000_000 + event as i64,
        }
    }

    fn tracker_work(name: &str, energies: &[f64]) -> WorkItem {
        let mut deposits = BTreeMap::new();
        for (i, e) in energies.iter().enumerate() {
            deposits.insert(
                i as u64,
                contracts::EnergyDeposit {
                    energy: *e,
                    time: 0.0,
                    position: contracts::Vector3::default(),
                },
            );
        }
        WorkItem {
            segment_id: 1,
            record: InputRecord::DepositMap(DepositMapping {
                name: name.into(),
                key: SegmentKey::new(0x0100, 0),
                data_type: SegmentKind::TrackerHits,
                deposits,
            }),
        }
    }

    #[test]
    fn test_exactly_once_creation_through_action() {
        let dir = tempfile::tempdir().unwrap();
        let mut action = OutputAction::new("edm_output", blueprint(dir.path(), WriterFormat::JsonLines));
        action.initialize().unwrap();

        let ids: Vec<_> = action.registry().iter().map(|(_, id, _)| id).collect();
        assert_eq!(ids.len(), 4); // EventHeader + 3 declared

        // A second initialize pass must not create anything new
        action.initialize().unwrap();
        let ids_after: Vec<_> = action.registry().iter().map(|(_, id, _)| id).collect();
        assert_eq!(ids, ids_after);
    }

    #[test]
    fn test_commit_clears_every_collection() {
        let dir = tempfile::tempdir().unwrap();
        let mut action = OutputAction::new("edm_output", blueprint(dir.path(), WriterFormat::JsonLines));
        action.initialize().unwrap();
        action.open_next().unwrap();

        action
            .execute(
                &ctx(1),
                &tracker_work("VertexHits", &[0.5, 0.6]),
                &DepositPredicate::accept_all(),
            )
            .unwrap();
        assert_eq!(action.registry().total_entries(), 2);

        action.commit_output(&ctx(1)).unwrap();
        for (_, _, collection) in action.registry().iter() {
            assert_eq!(collection.len(), 0);
        }
        action.close_output().unwrap();
    }

    #[test]
    fn test_commit_after_close_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut action = OutputAction::new("edm_output", blueprint(dir.path(), WriterFormat::JsonLines));
        action.initialize().unwrap();
        action.open_next().unwrap();
        action.commit_output(&ctx(1)).unwrap();
        action.close_output().unwrap();

        let err = action.commit_output(&ctx(2)).unwrap_err();
        assert!(matches!(err, ContractError::StreamNotOpen));
        assert_eq!(action.registry().total_entries(), 0);
    }

    #[test]
    fn test_rotation_reuses_collections_across_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut action = OutputAction::new("edm_output", blueprint(dir.path(), WriterFormat::JsonLines));
        action.initialize().unwrap();

        let ids: Vec<_> = action.registry().iter().map(|(_, id, _)| id).collect();

        let file_a = action.open_next().unwrap();
        action
            .execute(
                &ctx(1),
                &tracker_work("VertexHits", &[0.5]),
                &DepositPredicate::accept_all(),
            )
            .unwrap();
        action.commit_output(&ctx(1)).unwrap();
        action.commit_output(&ctx(2)).unwrap();
        action.close_output().unwrap();

        let file_b = action.open_next().unwrap();
        assert_ne!(file_a, file_b);

        let ids_after: Vec<_> = action.registry().iter().map(|(_, id, _)| id).collect();
        assert_eq!(ids, ids_after, "rotation must not recreate collections");
        for (_, _, collection) in action.registry().iter() {
            assert!(collection.is_empty(), "collections must start empty");
        }

        action.commit_output(&ctx(3)).unwrap();
        action.close_output().unwrap();
        assert_eq!(action.events_committed(), 3);
    }

    #[test]
    fn test_unknown_record_name_leaves_collections_unmodified() {
        let dir = tempfile::tempdir().unwrap();
        let mut action = OutputAction::new("edm_output", blueprint(dir.path(), WriterFormat::JsonLines));
        action.initialize().unwrap();
        action.open_next().unwrap();

        action
            .execute(
                &ctx(1),
                &tracker_work("VertexHits", &[0.5]),
                &DepositPredicate::accept_all(),
            )
            .unwrap();

        let err = action
            .execute(
                &ctx(1),
                &tracker_work("ForwardHits", &[0.5]),
                &DepositPredicate::accept_all(),
            )
            .unwrap_err();
        assert!(matches!(err, ContractError::CollectionNotFound { .. }));
        // The earlier append is still there, nothing else changed
        assert_eq!(action.registry().total_entries(), 1);

        action.close_output().unwrap();
    }

    #[test]
    fn test_predicate_selects_k_of_n_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut action = OutputAction::new("edm_output", blueprint(dir.path(), WriterFormat::JsonLines));
        action.initialize().unwrap();
        action.open_next().unwrap();

        // 6 candidates, 3 at or above threshold
        action
            .execute(
                &ctx(1),
                &tracker_work("VertexHits", &[0.1, 0.9, 0.3, 0.8, 0.2, 0.7]),
                &DepositPredicate::min_energy(0.5),
            )
            .unwrap();

        let handle = action.registry().lookup("VertexHits").unwrap();
        let collection = action.registry().get(handle);
        assert_eq!(collection.len(), 3);
        if let contracts::Collection::TrackerHits(hits) = collection {
            let cells: Vec<u64> = hits.iter().map(|h| h.cell_id).collect();
            assert_eq!(cells, vec![1, 3, 5]);
        } else {
            panic!("wrong collection kind");
        }

        action.close_output().unwrap();
    }
}

#[cfg(test)]
mod file_shape_tests {
    use std::io::BufRead;

    use contracts::WriterFormat;

    use super::run_small_pipeline;

    #[test]
    fn test_json_lines_file_shape() {
        let dir = tempfile::tempdir().unwrap();
        let file = run_small_pipeline(dir.path(), WriterFormat::JsonLines, 3);

        let reader = std::io::BufReader::new(std::fs::File::open(&file).unwrap());
        let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines.len(), 4, "meta line + 3 events");

        let meta: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        let names: Vec<&str> = meta["collections"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["EventHeader", "MCParticles", "VertexHits"]);

        for (i, line) in lines[1..].iter().enumerate() {
            let event: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(
                event["EventHeader"]["entries"][0]["event_number"],
                (i + 1) as u64
            );
            assert_eq!(event["VertexHits"]["kind"], "tracker_hits");
        }
    }

    #[test]
    fn test_covariance_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let file = run_small_pipeline(dir.path(), WriterFormat::JsonLines, 1);

        let content = std::fs::read_to_string(&file).unwrap();
        let event: serde_json::Value =
            serde_json::from_str(content.lines().nth(1).unwrap()).unwrap();
        let cov = &event["VertexHits"]["entries"][0]["covariance"];
        assert_eq!(cov[2], 4.0);
        assert_eq!(cov[5], 25.0);
        for idx in [0, 1, 3, 4] {
            assert_eq!(cov[idx], 0.0);
        }
    }

    #[test]
    fn test_bincode_file_is_created_and_finalized() {
        let dir = tempfile::tempdir().unwrap();
        let file = run_small_pipeline(dir.path(), WriterFormat::Bincode, 2);

        let bytes = std::fs::read(&file).unwrap();
        assert!(!bytes.is_empty());
        assert!(file.ends_with(".bin"));
    }
}

#[cfg(test)]
mod config_to_run_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{DepositPredicate, EventContext};
    use observability::CommitAggregator;
    use output_action::OutputAction;

    const CONFIG: &str = r#"
[run]
run_number = 5
events = 3

[output]
stem = "digi"

[[collections]]
name = "MCParticles"
kind = "particles"

[[collections]]
name = "VertexHits"
kind = "tracker_hits"

[processor]
point_resolution_r_phi = 2.0
point_resolution_z = 5.0
hit_type = 1

[[processors]]
name = "edm_output.0"
kind = "output_converter"
"#;

    #[test]
    fn test_loaded_config_drives_a_full_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut blueprint = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        blueprint.output.directory = dir.path().to_path_buf();

        let events = blueprint.run.events;
        let run_number = blueprint.run.run_number;
        let mut action = OutputAction::new("edm_output", blueprint);
        action.initialize().unwrap();
        action.open_next().unwrap();

        let mut aggregator = CommitAggregator::new();
        let predicate = DepositPredicate::accept_all();
        for event_number in 1..=events {
            let ctx = EventContext {
                run_number,
                event_number,
                time_stamp: 0,
            };
            for work in [super::tracker_work_for("VertexHits", event_number)] {
                action.execute(&ctx, &work, &predicate).unwrap();
            }
            let summary = action.commit_output(&ctx).unwrap();
            aggregator.update(&summary);
        }
        action.close_output().unwrap();

        let summary = aggregator.summary();
        assert_eq!(summary.total_events, 3);
        assert_eq!(summary.files_seen, 1);
        // One header and one hit per event
        assert_eq!(summary.collection_totals.get("EventHeader"), Some(&3));
        assert_eq!(summary.collection_totals.get("VertexHits"), Some(&3));
    }
}

#[cfg(test)]
mod component_tests {
    use contracts::{
        CollectionDescriptor, CollectionKind, ProcessorConfig, StreamNamer, WriterFormat,
    };
    use converters::PointResolution;
    use event_store::CollectionRegistry;
    use stream_writer::{SequentialNamer, StreamManager};

    #[test]
    fn test_stream_manager_open_commit_close_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = CollectionRegistry::new();
        registry
            .create_collections(&[CollectionDescriptor::new(
                "EcalHits",
                CollectionKind::CalorimeterHits,
            )])
            .unwrap();

        let mut namer = SequentialNamer::new(dir.path(), "digi", WriterFormat::JsonLines);
        let mut manager = StreamManager::new(WriterFormat::JsonLines);

        for _ in 0..2 {
            let file = namer.next_file_name();
            manager.open(&file, &registry).unwrap();
            manager.commit(&mut registry).unwrap();
            manager.close().unwrap();
            assert!(std::path::Path::new(&file).exists());
        }
        assert_eq!(namer.next_index(), 2);
    }

    #[test]
    fn test_point_resolution_covariance_packing() {
        let resolution = PointResolution { r_phi: 2.0, z: 5.0 };
        assert_eq!(resolution.covariance(), [0.0, 0.0, 4.0, 0.0, 0.0, 25.0]);

        let converter = converters::RecordConverter::new(
            "edm_output.0",
            &ProcessorConfig {
                point_resolution_r_phi: 0.004,
                point_resolution_z: 0.05,
                hit_type: 0,
            },
        );
        assert_eq!(converter.name(), "edm_output.0");
    }
}

/// Build a one-deposit tracker work item targeting `name`
#[cfg(test)]
fn tracker_work_for(name: &str, event_number: u64) -> contracts::WorkItem {
    use std::collections::BTreeMap;

    use contracts::{
        DepositMapping, EnergyDeposit, InputRecord, SegmentKey, SegmentKind, Vector3, WorkItem,
    };

    let mut deposits = BTreeMap::new();
    deposits.insert(
        event_number,
        EnergyDeposit {
            energy: 0.6,
            time: 0.0,
            position: Vector3::default(),
        },
    );
    WorkItem {
        segment_id: 0,
        record: InputRecord::DepositMap(DepositMapping {
            name: name.into(),
            key: SegmentKey::new(0x0100, 0),
            data_type: SegmentKind::TrackerHits,
            deposits,
        }),
    }
}

/// Drive a minimal run and return the produced file name
#[cfg(test)]
fn run_small_pipeline(
    dir: &std::path::Path,
    format: contracts::WriterFormat,
    events: u64,
) -> String {
    use std::collections::BTreeMap;

    use contracts::{
        CollectionDescriptor, CollectionKind, ConfigVersion, DepositMapping, DepositPredicate,
        EventContext, InputRecord, OutputBlueprint, OutputConfig, ProcessorConfig, RunConfig,
        SegmentKey, SegmentKind, WorkItem,
    };
    use output_action::OutputAction;

    let blueprint = OutputBlueprint {
        version: ConfigVersion::V1,
        run: RunConfig {
            run_number: 2,
            events,
        },
        output: OutputConfig {
            directory: dir.to_path_buf(),
            stem: "digi".into(),
            format,
            events_per_file: 0,
        },
        collections: vec![
            CollectionDescriptor::new("MCParticles", CollectionKind::Particles),
            CollectionDescriptor::new("VertexHits", CollectionKind::TrackerHits),
        ],
        processor: ProcessorConfig {
            point_resolution_r_phi: 2.0,
            point_resolution_z: 5.0,
            hit_type: 1,
        },
        processors: vec![],
    };

    let mut action = OutputAction::new("edm_output", blueprint);
    action.initialize().unwrap();
    let file = action.open_next().unwrap();

    for event_number in 1..=events {
        let ctx = EventContext {
            run_number: 2,
            event_number,
            time_stamp: 0,
        };
        let mut deposits = BTreeMap::new();
        deposits.insert(
            event_number,
            contracts::EnergyDeposit {
                energy: 0.75,
                time: 0.0,
                position: contracts::Vector3::default(),
            },
        );
        let work = WorkItem {
            segment_id: 0,
            record: InputRecord::DepositMap(DepositMapping {
                name: "VertexHits".into(),
                key: SegmentKey::new(0x0100, 0),
                data_type: SegmentKind::TrackerHits,
                deposits,
            }),
        };
        action
            .execute(&ctx, &work, &DepositPredicate::accept_all())
            .unwrap();
        action.commit_output(&ctx).unwrap();
    }

    action.close_output().unwrap();
    file
}
