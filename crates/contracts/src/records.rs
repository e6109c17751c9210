//! Input record variants - what the upstream digitization stages hand over
//!
//! Per event, the framework delivers a sequence of work items. Each carries
//! exactly one record variant; the set of variants is closed, so dispatch is
//! an exhaustive match rather than runtime type inspection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Vector3;

/// Provenance key of an upstream processing segment
///
/// `mask` identifies the producing segment and is logged as four hex digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentKey {
    pub mask: u16,
    pub item: u16,
}

impl SegmentKey {
    /// Create a key with the given mask and item number
    pub fn new(mask: u16, item: u16) -> Self {
        Self { mask, item }
    }
}

/// Payload tag of a deposit container
///
/// Mirrors the upstream segment-entry types; only `TrackerHits` and
/// `CalorimeterHits` have converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    ParticleRecords,
    TrackerHits,
    CalorimeterHits,
    History,
}

/// Simulated particle as produced upstream
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pdg_id: i32,
    pub generator_status: i32,
    pub charge: f32,
    pub mass: f64,
    pub time: f64,
    pub vertex: Vector3,
    pub momentum: Vector3,
}

/// A single energy deposit in one detector cell
///
/// The cell identifier lives in the surrounding container (map key or
/// vector pair), not in the deposit itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyDeposit {
    /// Deposited energy (GeV)
    pub energy: f64,

    /// Deposit time (ns)
    pub time: f64,

    /// Deposit position
    pub position: Vector3,
}

/// Particle table keyed by history identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleMapping {
    pub name: String,
    pub key: SegmentKey,
    /// Iteration in key order is the input order
    pub particles: BTreeMap<u64, Particle>,
}

impl ParticleMapping {
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

/// Keyed deposit container (cell id -> deposit)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositMapping {
    pub name: String,
    pub key: SegmentKey,
    pub data_type: SegmentKind,
    pub deposits: BTreeMap<u64, EnergyDeposit>,
}

impl DepositMapping {
    pub fn len(&self) -> usize {
        self.deposits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deposits.is_empty()
    }

    /// Iterate deposits as (cell_id, deposit) in cell-id order
    pub fn iter(&self) -> impl Iterator<Item = (u64, &EnergyDeposit)> {
        self.deposits.iter().map(|(cell, depo)| (*cell, depo))
    }
}

/// Sequential deposit container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositVector {
    pub name: String,
    pub key: SegmentKey,
    pub data_type: SegmentKind,
    pub deposits: Vec<(u64, EnergyDeposit)>,
}

impl DepositVector {
    pub fn len(&self) -> usize {
        self.deposits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deposits.is_empty()
    }

    /// Iterate deposits as (cell_id, deposit) in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (u64, &EnergyDeposit)> {
        self.deposits.iter().map(|(cell, depo)| (*cell, depo))
    }
}

/// One link of a deposit provenance chain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryLink {
    pub cell_id: u64,
    pub source_mask: u16,
    pub weight: f64,
}

/// Deposit provenance chain
///
/// No output converter exists for this variant; it is logged and dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositsHistory {
    pub name: String,
    pub key: SegmentKey,
    pub links: Vec<HistoryLink>,
}

/// The closed set of record variants a work item can carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputRecord {
    Particles(ParticleMapping),
    DepositMap(DepositMapping),
    DepositVec(DepositVector),
    History(DepositsHistory),
}

impl InputRecord {
    /// Name of the record (target collection name for deposits)
    pub fn name(&self) -> &str {
        match self {
            Self::Particles(m) => &m.name,
            Self::DepositMap(m) => &m.name,
            Self::DepositVec(v) => &v.name,
            Self::History(h) => &h.name,
        }
    }

    /// Provenance key of the producing segment
    pub fn key(&self) -> SegmentKey {
        match self {
            Self::Particles(m) => m.key,
            Self::DepositMap(m) => m.key,
            Self::DepositVec(v) => v.key,
            Self::History(h) => h.key,
        }
    }
}

/// One unit of conversion work within an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Identifier of the processing segment that produced the record
    pub segment_id: u32,

    /// The record to convert
    pub record: InputRecord,
}

/// Per-event context supplied by the framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
    pub run_number: i32,
    pub event_number: u64,
    /// Wall-clock timestamp (nanoseconds since epoch)
    pub time_stamp: i64,
}
