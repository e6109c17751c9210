//! Mock event source
//!
//! Generates deterministic per-event work items from the blueprint's
//! collection declarations. Used to exercise the output stage without the
//! upstream digitization chain.

use std::collections::BTreeMap;

use contracts::{
    CollectionKind, DepositMapping, DepositVector, DepositsHistory, EnergyDeposit, HistoryLink,
    InputRecord, OutputBlueprint, Particle, ParticleMapping, SegmentKey, SegmentKind, Vector3,
    WorkItem,
};

/// Deterministic generator of per-event work items
///
/// Every declared collection receives one record per event: the particle
/// collection a `ParticleMapping`, tracker collections a `DepositMapping`,
/// calorimeter collections a `DepositVector`. One `DepositsHistory` record
/// is emitted per event to exercise the documented no-op path.
pub struct MockEventSource {
    particle_name: Option<String>,
    tracker_names: Vec<String>,
    calorimeter_names: Vec<String>,
}

impl MockEventSource {
    /// Build a source from the blueprint's collection declarations
    pub fn from_blueprint(blueprint: &OutputBlueprint) -> Self {
        let mut particle_name = None;
        let mut tracker_names = Vec::new();
        let mut calorimeter_names = Vec::new();

        for desc in &blueprint.collections {
            match desc.kind {
                CollectionKind::Particles => {
                    if particle_name.is_none() {
                        particle_name = Some(desc.name.clone());
                    }
                }
                CollectionKind::TrackerHits => tracker_names.push(desc.name.clone()),
                CollectionKind::CalorimeterHits => calorimeter_names.push(desc.name.clone()),
                CollectionKind::EventHeader => {}
            }
        }

        Self {
            particle_name,
            tracker_names,
            calorimeter_names,
        }
    }

    /// Generate the work items of one event
    pub fn event(&self, event_number: u64) -> Vec<WorkItem> {
        let mut items = Vec::new();
        let mut segment_id = 0u32;

        if let Some(name) = &self.particle_name {
            items.push(WorkItem {
                segment_id,
                record: InputRecord::Particles(self.particles(name, event_number)),
            });
            segment_id += 1;
        }

        for (idx, name) in self.tracker_names.iter().enumerate() {
            items.push(WorkItem {
                segment_id,
                record: InputRecord::DepositMap(self.tracker_deposits(name, event_number, idx)),
            });
            segment_id += 1;
        }

        for (idx, name) in self.calorimeter_names.iter().enumerate() {
            items.push(WorkItem {
                segment_id,
                record: InputRecord::DepositVec(self.calorimeter_deposits(name, event_number, idx)),
            });
            segment_id += 1;
        }

        if let Some(name) = self.tracker_names.first() {
            items.push(WorkItem {
                segment_id,
                record: InputRecord::History(DepositsHistory {
                    name: format!("{name}History"),
                    key: SegmentKey::new(0x0F00, event_number as u16),
                    links: vec![HistoryLink {
                        cell_id: event_number,
                        source_mask: 0x0F00,
                        weight: 1.0,
                    }],
                }),
            });
        }

        items
    }

    fn particles(&self, name: &str, event_number: u64) -> ParticleMapping {
        let count = 3 + (event_number % 3) as usize;
        let mut particles = BTreeMap::new();
        for i in 0..count {
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            particles.insert(
                event_number * 100 + i as u64,
                Particle {
                    pdg_id: if i % 2 == 0 { 11 } else { -11 },
                    generator_status: 1,
                    charge: (-sign) as f32,
                    mass: 0.000511,
                    time: 0.0,
                    vertex: Vector3::default(),
                    momentum: Vector3 {
                        x: sign * (1.0 + i as f64),
                        y: 0.5 * i as f64,
                        z: 10.0,
                    },
                },
            );
        }
        ParticleMapping {
            name: name.to_string(),
            key: SegmentKey::new(0x0001, 0),
            particles,
        }
    }

    fn tracker_deposits(&self, name: &str, event_number: u64, idx: usize) -> DepositMapping {
        let count = 4 + (event_number % 4) as usize;
        let mut deposits = BTreeMap::new();
        for i in 0..count {
            deposits.insert(
                ((idx as u64) << 32) | (event_number * 10 + i as u64),
                self.deposit(event_number, i),
            );
        }
        DepositMapping {
            name: name.to_string(),
            key: SegmentKey::new(0x0100 + idx as u16, 0),
            data_type: SegmentKind::TrackerHits,
            deposits,
        }
    }

    fn calorimeter_deposits(&self, name: &str, event_number: u64, idx: usize) -> DepositVector {
        let count = 2 + (event_number % 5) as usize;
        let deposits = (0..count)
            .map(|i| {
                (
                    ((idx as u64) << 40) | (event_number * 10 + i as u64),
                    self.deposit(event_number, i),
                )
            })
            .collect();
        DepositVector {
            name: name.to_string(),
            key: SegmentKey::new(0x0200 + idx as u16, 0),
            data_type: SegmentKind::CalorimeterHits,
            deposits,
        }
    }

    fn deposit(&self, event_number: u64, index: usize) -> EnergyDeposit {
        // Spread energies over [0.05, 1.0) so threshold predicates bite
        let energy = 0.05 + 0.095 * ((event_number as usize + index) % 10) as f64;
        EnergyDeposit {
            energy,
            time: 0.1 * index as f64,
            position: Vector3 {
                x: index as f64,
                y: event_number as f64,
                z: 2.0 * index as f64,
            },
        }
    }
}
