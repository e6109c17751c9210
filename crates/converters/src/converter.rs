//! RecordConverter - routes each work item into the matching collection
//!
//! The variant set is closed, so dispatch is an exhaustive match. Deposit
//! records name their own target collection; particle mappings always go to
//! the single configured particle collection.

use metrics::counter;
use tracing::info;

use contracts::{
    CalorimeterHitEntry, ContractError, DepositPredicate, DepositsHistory, EnergyDeposit,
    EventContext, InputRecord, ParticleEntry, ParticleMapping, ProcessorConfig, SegmentKey,
    SegmentKind, TrackerHitEntry, WorkItem, COVARIANCE_DIM,
};
use event_store::CollectionRegistry;

/// Configured tracker point resolutions (mm)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointResolution {
    pub r_phi: f64,
    pub z: f64,
}

impl PointResolution {
    /// Packed position covariance derived from the resolutions
    ///
    /// Lower-triangular 3x3 packing; only the r-phi (index 2) and z
    /// (index 5) diagonal components are populated. Identical for every
    /// tracker hit of a run.
    pub fn covariance(&self) -> [f32; COVARIANCE_DIM] {
        [
            0.0,
            0.0,
            (self.r_phi * self.r_phi) as f32,
            0.0,
            0.0,
            (self.z * self.z) as f32,
        ]
    }
}

/// Converts upstream records into output collection entries
pub struct RecordConverter {
    name: String,
    resolution: PointResolution,
    hit_type: i32,
}

impl RecordConverter {
    /// Create a converter from processor configuration
    pub fn new(name: impl Into<String>, config: &ProcessorConfig) -> Self {
        Self {
            name: name.into(),
            resolution: PointResolution {
                r_phi: config.point_resolution_r_phi,
                z: config.point_resolution_z,
            },
            hit_type: config.hit_type,
        }
    }

    /// Converter instance name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Main conversion callback, invoked once per record within an event
    ///
    /// Calls for one run must be serialized by the caller; the registry
    /// borrow enforces a single writer per call.
    pub fn execute(
        &self,
        ctx: &EventContext,
        work: &WorkItem,
        predicate: &DepositPredicate,
        registry: &mut CollectionRegistry,
    ) -> Result<(), ContractError> {
        match &work.record {
            InputRecord::Particles(mapping) => self.convert_particles(ctx, mapping, registry),
            InputRecord::DepositMap(mapping) => self.convert_deposits(
                ctx,
                &mapping.name,
                mapping.key,
                mapping.data_type,
                mapping.len(),
                mapping.iter(),
                predicate,
                registry,
            ),
            InputRecord::DepositVec(vector) => self.convert_deposits(
                ctx,
                &vector.name,
                vector.key,
                vector.data_type,
                vector.len(),
                vector.iter(),
                predicate,
                registry,
            ),
            InputRecord::History(history) => {
                self.convert_history(ctx, history, work, predicate);
                Ok(())
            }
        }
    }

    /// Append one particle entry per input particle, in input order
    fn convert_particles(
        &self,
        ctx: &EventContext,
        mapping: &ParticleMapping,
        registry: &mut CollectionRegistry,
    ) -> Result<(), ContractError> {
        let handle = registry
            .particles_handle()
            .ok_or_else(|| ContractError::CollectionNotFound {
                name: mapping.name.clone(),
            })?;

        let collection = registry.particles_mut(handle)?;
        let start = collection.len();
        for particle in mapping.particles.values() {
            collection.push(ParticleEntry {
                pdg_id: particle.pdg_id,
                generator_status: particle.generator_status,
                charge: particle.charge,
                mass: particle.mass,
                time: particle.time,
                vertex: particle.vertex,
                momentum: particle.momentum,
            });
        }
        let end = collection.len();

        counter!("digi_writer_entries_total", "kind" => "particles")
            .increment((end - start) as u64);
        info!(
            event = ctx.event_number,
            record = %mapping.name,
            added = end - start,
            total = end,
            mask = %format_args!("{:04X}", mapping.key.mask),
            target = registry.get(handle).kind().type_name(),
            "entries appended"
        );
        Ok(())
    }

    /// Append filtered deposit entries into the collection named by the record
    #[allow(clippy::too_many_arguments)]
    fn convert_deposits<'a>(
        &self,
        ctx: &EventContext,
        name: &str,
        key: SegmentKey,
        data_type: SegmentKind,
        len: usize,
        deposits: impl Iterator<Item = (u64, &'a EnergyDeposit)>,
        predicate: &DepositPredicate,
        registry: &mut CollectionRegistry,
    ) -> Result<(), ContractError> {
        let handle = registry.lookup(name)?;
        let start = registry.get(handle).len();

        // Empty containers skip the tag dispatch entirely
        if len > 0 {
            match data_type {
                SegmentKind::TrackerHits => {
                    let covariance = self.resolution.covariance();
                    let collection = registry.tracker_hits_mut(handle)?;
                    for (cell_id, depo) in deposits {
                        if predicate.accepts(depo) {
                            collection.push(TrackerHitEntry {
                                cell_id,
                                hit_type: self.hit_type,
                                time: depo.time,
                                energy_deposit: depo.energy,
                                position: depo.position,
                                covariance,
                            });
                        }
                    }
                }
                SegmentKind::CalorimeterHits => {
                    let collection = registry.calorimeter_hits_mut(handle)?;
                    for (cell_id, depo) in deposits {
                        if predicate.accepts(depo) {
                            collection.push(CalorimeterHitEntry {
                                cell_id,
                                hit_type: self.hit_type,
                                energy: depo.energy,
                                time: depo.time,
                                position: depo.position,
                            });
                        }
                    }
                }
                other => {
                    return Err(ContractError::UnknownDepositKind {
                        record: name.to_string(),
                        kind: other,
                    });
                }
            }
        }

        let end = registry.get(handle).len();
        counter!("digi_writer_entries_total", "kind" => "deposits").increment((end - start) as u64);
        info!(
            event = ctx.event_number,
            record = %name,
            added = end - start,
            total = end,
            mask = %format_args!("{:04X}", key.mask),
            target = registry.get(handle).kind().type_name(),
            "entries appended"
        );
        Ok(())
    }

    /// Documented no-op: no converter exists for provenance chains
    fn convert_history(
        &self,
        ctx: &EventContext,
        history: &DepositsHistory,
        work: &WorkItem,
        predicate: &DepositPredicate,
    ) {
        info!(
            event = ctx.event_number,
            record = %history.name,
            segment = work.segment_id,
            predicate = predicate.name(),
            links = history.links.len(),
            "deposit history conversion not implemented, entries dropped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use contracts::{CollectionDescriptor, CollectionKind, DepositMapping, DepositVector, Particle, Vector3};

    fn config() -> ProcessorConfig {
        ProcessorConfig {
            point_resolution_r_phi: 2.0,
            point_resolution_z: 5.0,
            hit_type: 3,
        }
    }

    fn registry() -> CollectionRegistry {
        let mut registry = CollectionRegistry::new();
        registry
            .create_collections(&[
                CollectionDescriptor::new("MCParticles", CollectionKind::Particles),
                CollectionDescriptor::new("VertexHits", CollectionKind::TrackerHits),
                CollectionDescriptor::new("EcalHits", CollectionKind::CalorimeterHits),
            ])
            .unwrap();
        registry
    }

    fn ctx() -> EventContext {
        EventContext {
            run_number: 1,
            event_number: 1,
            time_stamp: 0,
        }
    }

    fn deposit(energy: f64) -> EnergyDeposit {
        EnergyDeposit {
            energy,
            time: 9.5,
            position: Vector3 {
                x: 1.0,
                y: 2.0,
                z: 3.0,
            },
        }
    }

    fn tracker_mapping(energies: &[f64]) -> DepositMapping {
        let mut deposits = BTreeMap::new();
        for (i, e) in energies.iter().enumerate() {
            deposits.insert(i as u64, deposit(*e));
        }
        DepositMapping {
            name: "VertexHits".into(),
            key: SegmentKey::new(0x0100, 0),
            data_type: SegmentKind::TrackerHits,
            deposits,
        }
    }

    #[test]
    fn test_covariance_derivation() {
        let converter = RecordConverter::new("edm_output.0", &config());
        let mut registry = registry();
        let work = WorkItem {
            segment_id: 0,
            record: InputRecord::DepositMap(tracker_mapping(&[0.5, 0.7])),
        };
        converter
            .execute(&ctx(), &work, &DepositPredicate::accept_all(), &mut registry)
            .unwrap();

        let handle = registry.lookup("VertexHits").unwrap();
        let hits = registry.tracker_hits_mut(handle).unwrap();
        assert_eq!(hits.len(), 2);
        for hit in hits.iter() {
            assert_eq!(hit.covariance, [0.0, 0.0, 4.0, 0.0, 0.0, 25.0]);
            assert_eq!(hit.hit_type, 3);
        }
    }

    #[test]
    fn test_predicate_filters_in_order() {
        let converter = RecordConverter::new("edm_output.0", &config());
        let mut registry = registry();
        let work = WorkItem {
            segment_id: 0,
            record: InputRecord::DepositMap(tracker_mapping(&[0.1, 0.9, 0.2, 0.8, 0.7])),
        };
        converter
            .execute(
                &ctx(),
                &work,
                &DepositPredicate::min_energy(0.5),
                &mut registry,
            )
            .unwrap();

        let handle = registry.lookup("VertexHits").unwrap();
        let hits = registry.tracker_hits_mut(handle).unwrap();
        let cells: Vec<u64> = hits.iter().map(|h| h.cell_id).collect();
        assert_eq!(cells, vec![1, 3, 4]);
    }

    #[test]
    fn test_calorimeter_conversion() {
        let converter = RecordConverter::new("edm_output.0", &config());
        let mut registry = registry();
        let work = WorkItem {
            segment_id: 0,
            record: InputRecord::DepositVec(DepositVector {
                name: "EcalHits".into(),
                key: SegmentKey::new(0x0200, 0),
                data_type: SegmentKind::CalorimeterHits,
                deposits: vec![(42, deposit(1.5))],
            }),
        };
        converter
            .execute(&ctx(), &work, &DepositPredicate::accept_all(), &mut registry)
            .unwrap();

        let handle = registry.lookup("EcalHits").unwrap();
        let hits = registry.calorimeter_hits_mut(handle).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].cell_id, 42);
        assert_eq!(hits[0].energy, 1.5);
        assert_eq!(hits[0].hit_type, 3);
    }

    #[test]
    fn test_particles_in_input_order() {
        let converter = RecordConverter::new("edm_output.0", &config());
        let mut registry = registry();
        let mut particles = BTreeMap::new();
        for (key, pdg) in [(3u64, 11), (1, 13), (2, 22)] {
            particles.insert(
                key,
                Particle {
                    pdg_id: pdg,
                    generator_status: 1,
                    charge: -1.0,
                    mass: 0.000511,
                    time: 0.0,
                    vertex: Vector3::default(),
                    momentum: Vector3::default(),
                },
            );
        }
        let work = WorkItem {
            segment_id: 0,
            record: InputRecord::Particles(ParticleMapping {
                name: "MCParticles".into(),
                key: SegmentKey::new(0x0001, 0),
                particles,
            }),
        };
        converter
            .execute(&ctx(), &work, &DepositPredicate::accept_all(), &mut registry)
            .unwrap();

        let handle = registry.particles_handle().unwrap();
        let entries = registry.particles_mut(handle).unwrap();
        let pdgs: Vec<i32> = entries.iter().map(|p| p.pdg_id).collect();
        assert_eq!(pdgs, vec![13, 22, 11]); // key order 1, 2, 3
    }

    #[test]
    fn test_unknown_collection_name_is_fatal() {
        let converter = RecordConverter::new("edm_output.0", &config());
        let mut registry = registry();
        let mut mapping = tracker_mapping(&[0.5]);
        mapping.name = "NoSuchHits".into();
        let work = WorkItem {
            segment_id: 0,
            record: InputRecord::DepositMap(mapping),
        };
        let err = converter
            .execute(&ctx(), &work, &DepositPredicate::accept_all(), &mut registry)
            .unwrap_err();
        assert!(matches!(err, ContractError::CollectionNotFound { .. }));
        assert_eq!(registry.total_entries(), 0);
    }

    #[test]
    fn test_unknown_deposit_kind_is_fatal() {
        let converter = RecordConverter::new("edm_output.0", &config());
        let mut registry = registry();
        let mut mapping = tracker_mapping(&[0.5]);
        mapping.data_type = SegmentKind::History;
        let work = WorkItem {
            segment_id: 0,
            record: InputRecord::DepositMap(mapping),
        };
        let err = converter
            .execute(&ctx(), &work, &DepositPredicate::accept_all(), &mut registry)
            .unwrap_err();
        assert!(matches!(err, ContractError::UnknownDepositKind { .. }));
        assert_eq!(registry.total_entries(), 0);
    }

    #[test]
    fn test_empty_container_skips_tag_dispatch() {
        let converter = RecordConverter::new("edm_output.0", &config());
        let mut registry = registry();
        let mut mapping = tracker_mapping(&[]);
        mapping.data_type = SegmentKind::History; // would be fatal if dispatched
        let work = WorkItem {
            segment_id: 0,
            record: InputRecord::DepositMap(mapping),
        };
        assert!(converter
            .execute(&ctx(), &work, &DepositPredicate::accept_all(), &mut registry)
            .is_ok());
    }

    #[test]
    fn test_history_is_a_no_op() {
        let converter = RecordConverter::new("edm_output.0", &config());
        let mut registry = registry();
        let work = WorkItem {
            segment_id: 5,
            record: InputRecord::History(DepositsHistory {
                name: "VertexHistory".into(),
                key: SegmentKey::new(0x0100, 0),
                links: vec![contracts::HistoryLink {
                    cell_id: 1,
                    source_mask: 0x0100,
                    weight: 1.0,
                }],
            }),
        };
        converter
            .execute(&ctx(), &work, &DepositPredicate::accept_all(), &mut registry)
            .unwrap();
        assert_eq!(registry.total_entries(), 0);
    }
}
