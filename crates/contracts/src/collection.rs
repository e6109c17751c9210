//! Collection model - named, typed, growable output sequences
//!
//! A collection is created exactly once per run and cleared in place after
//! every committed event. The registry in `event_store` owns them; everything
//! else sees non-owning views or handles.

use serde::{Deserialize, Serialize};

use crate::{CalorimeterHitEntry, EventHeaderEntry, ParticleEntry, TrackerHitEntry};

/// Reserved name of the automatically created event header collection
pub const EVENT_HEADER_NAME: &str = "EventHeader";

/// Collection kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// Per-event bookkeeping, created automatically
    EventHeader,
    /// Simulated particle table
    Particles,
    /// Digitized tracker hits with position covariance
    TrackerHits,
    /// Digitized calorimeter hits
    CalorimeterHits,
}

impl CollectionKind {
    /// Stable type name used in logs and file metadata
    pub fn type_name(self) -> &'static str {
        match self {
            Self::EventHeader => "EventHeaderCollection",
            Self::Particles => "ParticleCollection",
            Self::TrackerHits => "TrackerHitCollection",
            Self::CalorimeterHits => "CalorimeterHitCollection",
        }
    }
}

/// Declares a collection before it exists: (name, kind)
///
/// Immutable after creation. Names are unique within a run;
/// `EventHeader` is reserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionDescriptor {
    /// Output collection name
    pub name: String,

    /// Entry kind stored in the collection
    pub kind: CollectionKind,
}

impl CollectionDescriptor {
    /// Create a descriptor
    pub fn new(name: impl Into<String>, kind: CollectionKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A typed, growable sequence of output entries of one kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entries", rename_all = "snake_case")]
pub enum Collection {
    EventHeader(Vec<EventHeaderEntry>),
    Particles(Vec<ParticleEntry>),
    TrackerHits(Vec<TrackerHitEntry>),
    CalorimeterHits(Vec<CalorimeterHitEntry>),
}

impl Collection {
    /// Allocate an empty collection of the given kind
    pub fn empty(kind: CollectionKind) -> Self {
        match kind {
            CollectionKind::EventHeader => Self::EventHeader(Vec::new()),
            CollectionKind::Particles => Self::Particles(Vec::new()),
            CollectionKind::TrackerHits => Self::TrackerHits(Vec::new()),
            CollectionKind::CalorimeterHits => Self::CalorimeterHits(Vec::new()),
        }
    }

    /// Kind of the stored entries
    pub fn kind(&self) -> CollectionKind {
        match self {
            Self::EventHeader(_) => CollectionKind::EventHeader,
            Self::Particles(_) => CollectionKind::Particles,
            Self::TrackerHits(_) => CollectionKind::TrackerHits,
            Self::CalorimeterHits(_) => CollectionKind::CalorimeterHits,
        }
    }

    /// Number of entries currently held
    pub fn len(&self) -> usize {
        match self {
            Self::EventHeader(v) => v.len(),
            Self::Particles(v) => v.len(),
            Self::TrackerHits(v) => v.len(),
            Self::CalorimeterHits(v) => v.len(),
        }
    }

    /// Whether the collection holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all entries, retaining the collection object
    pub fn clear(&mut self) {
        match self {
            Self::EventHeader(v) => v.clear(),
            Self::Particles(v) => v.clear(),
            Self::TrackerHits(v) => v.clear(),
            Self::CalorimeterHits(v) => v.clear(),
        }
    }
}
