//! Output entry types - what ends up inside a collection
//!
//! One struct per collection kind. All entries are plain serde-visible data;
//! the persistence backend decides the byte layout.

use serde::{Deserialize, Serialize};

/// 3D vector (millimeters for positions, GeV for momenta)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Per-event bookkeeping entry
///
/// Exactly one is appended automatically at every commit. Never configured
/// by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EventHeaderEntry {
    /// Run number assigned at configuration time
    pub run_number: i32,

    /// Event sequence number assigned by the framework
    pub event_number: u64,

    /// Wall-clock timestamp (nanoseconds since epoch)
    pub time_stamp: i64,

    /// Event weight
    pub weight: f64,
}

/// Simulated particle entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleEntry {
    /// PDG particle code
    pub pdg_id: i32,

    /// Generator status word
    pub generator_status: i32,

    /// Electric charge (units of e)
    pub charge: f32,

    /// Rest mass (GeV)
    pub mass: f64,

    /// Production time (ns)
    pub time: f64,

    /// Production vertex
    pub vertex: Vector3,

    /// Momentum at the vertex
    pub momentum: Vector3,
}

/// Number of components in the packed hit covariance
///
/// Lower-triangular packing of a symmetric 3x3 position covariance:
/// indices (0,0) (1,0) (1,1) (2,0) (2,1) (2,2).
pub const COVARIANCE_DIM: usize = 6;

/// Digitized tracker hit entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerHitEntry {
    /// Detector cell identifier
    pub cell_id: u64,

    /// Configured hit type tag, identical for every hit of a run
    pub hit_type: i32,

    /// Hit time (ns)
    pub time: f64,

    /// Deposited energy (GeV)
    pub energy_deposit: f64,

    /// Hit position
    pub position: Vector3,

    /// Packed position covariance; only the r-phi and z diagonal
    /// components are populated
    pub covariance: [f32; COVARIANCE_DIM],
}

/// Digitized calorimeter hit entry (no position covariance)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalorimeterHitEntry {
    /// Detector cell identifier
    pub cell_id: u64,

    /// Configured hit type tag
    pub hit_type: i32,

    /// Reconstructed energy (GeV)
    pub energy: f64,

    /// Hit time (ns)
    pub time: f64,

    /// Hit position
    pub position: Vector3,
}
