//! CollectionRegistry - arena of named, typed output collections
//!
//! The registry is the single owner of all collection objects. Creation
//! happens once per run; afterwards converters append and the stream manager
//! clears, both through the registry, never through raw references.

use std::collections::HashMap;

use tracing::debug;

use contracts::{
    CalorimeterHitEntry, Collection, CollectionDescriptor, CollectionKind, ContractError,
    EventHeaderEntry, ParticleEntry, TrackerHitEntry, EVENT_HEADER_NAME,
};

/// Stable identity of a collection, assigned at creation
///
/// Survives rotation and clearing; two handles resolve to the same
/// collection iff their ids are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollectionId(u64);

/// Index-based handle into the registry arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionHandle(usize);

struct Slot {
    name: String,
    id: CollectionId,
    data: Collection,
}

/// Owner of every output collection of a run
#[derive(Default)]
pub struct CollectionRegistry {
    arena: Vec<Slot>,
    index: HashMap<String, CollectionHandle>,
    header: Option<CollectionHandle>,
    particles: Option<CollectionHandle>,
    next_id: u64,
}

impl CollectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the event header collection plus one collection per descriptor
    ///
    /// Idempotent: returns `Ok(false)` without touching anything if the
    /// header collection already exists. Must complete before the first
    /// stream open and before the first conversion; not safe to call
    /// concurrently with lookups.
    pub fn create_collections(
        &mut self,
        descriptors: &[CollectionDescriptor],
    ) -> Result<bool, ContractError> {
        if self.header.is_some() {
            return Ok(false);
        }

        let header = self.insert(EVENT_HEADER_NAME, CollectionKind::EventHeader)?;
        self.header = Some(header);

        for desc in descriptors {
            let handle = self.insert(&desc.name, desc.kind)?;
            if desc.kind == CollectionKind::Particles && self.particles.is_none() {
                self.particles = Some(handle);
            }
        }
        Ok(true)
    }

    /// Whether the creation pass has run
    pub fn is_created(&self) -> bool {
        self.header.is_some()
    }

    /// Resolve a collection name to its handle
    ///
    /// A miss means the declared record names and the configured collection
    /// descriptors disagree; always fatal for the run.
    pub fn lookup(&self, name: &str) -> Result<CollectionHandle, ContractError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| ContractError::CollectionNotFound {
                name: name.to_string(),
            })
    }

    /// Handle of the event header collection
    pub fn header_handle(&self) -> Option<CollectionHandle> {
        self.header
    }

    /// Handle of the first particle collection, if one was configured
    pub fn particles_handle(&self) -> Option<CollectionHandle> {
        self.particles
    }

    /// Read access to a collection
    pub fn get(&self, handle: CollectionHandle) -> &Collection {
        &self.arena[handle.0].data
    }

    /// Name of a collection
    pub fn name(&self, handle: CollectionHandle) -> &str {
        &self.arena[handle.0].name
    }

    /// Stable identity of a collection
    pub fn id(&self, handle: CollectionHandle) -> CollectionId {
        self.arena[handle.0].id
    }

    /// Append access to a tracker hit collection
    pub fn tracker_hits_mut(
        &mut self,
        handle: CollectionHandle,
    ) -> Result<&mut Vec<TrackerHitEntry>, ContractError> {
        let slot = &mut self.arena[handle.0];
        match &mut slot.data {
            Collection::TrackerHits(v) => Ok(v),
            other => Err(kind_mismatch(&slot.name, CollectionKind::TrackerHits, other)),
        }
    }

    /// Append access to a calorimeter hit collection
    pub fn calorimeter_hits_mut(
        &mut self,
        handle: CollectionHandle,
    ) -> Result<&mut Vec<CalorimeterHitEntry>, ContractError> {
        let slot = &mut self.arena[handle.0];
        match &mut slot.data {
            Collection::CalorimeterHits(v) => Ok(v),
            other => Err(kind_mismatch(
                &slot.name,
                CollectionKind::CalorimeterHits,
                other,
            )),
        }
    }

    /// Append access to a particle collection
    pub fn particles_mut(
        &mut self,
        handle: CollectionHandle,
    ) -> Result<&mut Vec<ParticleEntry>, ContractError> {
        let slot = &mut self.arena[handle.0];
        match &mut slot.data {
            Collection::Particles(v) => Ok(v),
            other => Err(kind_mismatch(&slot.name, CollectionKind::Particles, other)),
        }
    }

    /// Append access to the event header collection
    pub fn header_mut(&mut self) -> Result<&mut Vec<EventHeaderEntry>, ContractError> {
        let handle = self
            .header
            .ok_or_else(|| ContractError::CollectionNotFound {
                name: EVENT_HEADER_NAME.to_string(),
            })?;
        let slot = &mut self.arena[handle.0];
        match &mut slot.data {
            Collection::EventHeader(v) => Ok(v),
            other => Err(kind_mismatch(&slot.name, CollectionKind::EventHeader, other)),
        }
    }

    /// Iterate all collections in creation order
    pub fn iter(&self) -> impl Iterator<Item = (&str, CollectionId, &Collection)> {
        self.arena
            .iter()
            .map(|slot| (slot.name.as_str(), slot.id, &slot.data))
    }

    /// Remove all entries from every collection, retaining the objects
    pub fn clear_all(&mut self) {
        for slot in &mut self.arena {
            slot.data.clear();
        }
    }

    /// Number of collections
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether no collections exist yet
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Entries currently held across all collections
    pub fn total_entries(&self) -> usize {
        self.arena.iter().map(|slot| slot.data.len()).sum()
    }

    fn insert(&mut self, name: &str, kind: CollectionKind) -> Result<CollectionHandle, ContractError> {
        if self.index.contains_key(name) {
            return Err(ContractError::DuplicateCollection {
                name: name.to_string(),
            });
        }
        let handle = CollectionHandle(self.arena.len());
        let id = CollectionId(self.next_id);
        self.next_id += 1;
        self.arena.push(Slot {
            name: name.to_string(),
            id,
            data: Collection::empty(kind),
        });
        self.index.insert(name.to_string(), handle);
        debug!(
            collection = name,
            kind = kind.type_name(),
            "created collection"
        );
        Ok(handle)
    }
}

fn kind_mismatch(name: &str, expected: CollectionKind, actual: &Collection) -> ContractError {
    ContractError::KindMismatch {
        name: name.to_string(),
        expected,
        actual: actual.kind(),
    }
}
