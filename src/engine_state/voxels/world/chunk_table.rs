//! The table of resident chunks.
//!
//! One coarse lock guards the map. It is held only long enough to look up,
//! insert, remove or copy handles; all per-chunk work happens on the chunk's
//! own lock after the table lock is released.

use std::collections::HashMap;

use crate::core::MtResource;
use crate::engine_state::task_management::CancellationToken;
use crate::engine_state::voxels::chunk::{Chunk, ChunkCoord};

/// A resident chunk and the token of its build job.
#[derive(Clone, Debug)]
pub struct ChunkEntry {
    /// Shared handle to the chunk
    pub chunk: MtResource<Chunk>,
    /// Cancelled when the chunk is evicted
    pub job: CancellationToken,
}

/// Shared map from chunk coordinate to resident chunk.
///
/// Cloning the table clones the handle; every clone sees the same chunks.
#[derive(Clone, Debug)]
pub struct ChunkTable {
    entries: MtResource<HashMap<ChunkCoord, ChunkEntry>>,
}

impl Default for ChunkTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkTable {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            entries: MtResource::new(HashMap::new()),
        }
    }

    /// The chunk at `coord`, if resident.
    pub fn get(&self, coord: ChunkCoord) -> Option<MtResource<Chunk>> {
        self.entries.get().get(&coord).map(|entry| entry.chunk.clone())
    }

    /// The chunk and its job token.
    pub fn entry(&self, coord: ChunkCoord) -> Option<ChunkEntry> {
        self.entries.get().get(&coord).cloned()
    }

    /// Whether a chunk is resident at `coord`.
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.entries.get().contains_key(&coord)
    }

    /// Number of resident chunks.
    pub fn len(&self) -> usize {
        self.entries.get().len()
    }

    /// True when no chunk is resident.
    pub fn is_empty(&self) -> bool {
        self.entries.get().is_empty()
    }

    /// Creates a fresh, unlit chunk at `coord`.
    ///
    /// # Returns
    /// The new chunk and its job token, or `None` if `coord` is already resident.
    pub fn insert(&self, coord: ChunkCoord) -> Option<(MtResource<Chunk>, CancellationToken)> {
        let mut entries = self.entries.get_mut();
        if entries.contains_key(&coord) {
            return None;
        }
        let entry = ChunkEntry {
            chunk: MtResource::new(Chunk::new(coord)),
            job: CancellationToken::new(),
        };
        let created = (entry.chunk.clone(), entry.job.clone());
        entries.insert(coord, entry);
        Some(created)
    }

    /// Takes a chunk out of the table. The caller cancels its job.
    pub fn remove(&self, coord: ChunkCoord) -> Option<ChunkEntry> {
        self.entries.get_mut().remove(&coord)
    }

    /// Resident coordinates, sorted.
    pub fn coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<_> = self.entries.get().keys().copied().collect();
        coords.sort();
        coords
    }

    /// A point-in-time copy of every resident chunk handle, sorted by coordinate.
    pub fn snapshot(&self) -> Vec<(ChunkCoord, MtResource<Chunk>)> {
        let mut chunks: Vec<_> = self
            .entries
            .get()
            .iter()
            .map(|(coord, entry)| (*coord, entry.chunk.clone()))
            .collect();
        chunks.sort_by_key(|(coord, _)| *coord);
        chunks
    }
}
