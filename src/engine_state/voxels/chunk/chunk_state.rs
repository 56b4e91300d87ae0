//! # Chunk State
//!
//! Lifecycle of a single chunk instance, from creation through generation,
//! lighting and meshing, to ready-for-use and back to dirty after edits.

use std::fmt;

/// Where a chunk is in its build lifecycle.
///
/// ```text
/// Unlit -> Generating -> Lighting -> Ready <-> Dirty
///   |          |                      Dirty -> Lighting -> Ready
///   |          +-> Errored(reason)    (terminal)
///   +-> Awaiting (networked)   any pre-Ready state -> Cancelled (terminal)
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkState {
    /// Created, no terrain yet.
    Unlit,
    /// Requested from a remote authority, waiting for its payload.
    Awaiting,
    /// Terrain is being produced on a worker.
    Generating,
    /// Blocks are installed; light and mesh are being computed.
    Lighting,
    /// Blocks, light, mesh and collision inputs are current.
    Ready,
    /// Blocks changed since the last light/mesh pass.
    Dirty,
    /// Generation failed. Never retried for this chunk instance.
    Errored(String),
    /// Evicted before its build finished.
    Cancelled,
}

impl ChunkState {
    /// Returns `true` once the block grid holds real terrain.
    pub fn has_blocks(&self) -> bool {
        matches!(
            self,
            ChunkState::Lighting | ChunkState::Ready | ChunkState::Dirty
        )
    }

    /// Returns `true` for states a chunk never leaves.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChunkState::Errored(_) | ChunkState::Cancelled)
    }

    /// Returns `true` while terrain is still expected to arrive.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            ChunkState::Unlit | ChunkState::Awaiting | ChunkState::Generating
        )
    }
}

impl fmt::Display for ChunkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkState::Unlit => write!(f, "unlit"),
            ChunkState::Awaiting => write!(f, "awaiting"),
            ChunkState::Generating => write!(f, "generating"),
            ChunkState::Lighting => write!(f, "lighting"),
            ChunkState::Ready => write!(f, "ready"),
            ChunkState::Dirty => write!(f, "dirty"),
            ChunkState::Errored(reason) => write!(f, "errored ({reason})"),
            ChunkState::Cancelled => write!(f, "cancelled"),
        }
    }
}
