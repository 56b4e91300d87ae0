//! Loading chunks from disk.
//!
//! There is no on-disk chunk format. The hook exists so the world asks a
//! loader before generating, and [`DiskChunkLoader`] answers every request
//! with [`LoadError::NotImplemented`].

use log::debug;

use crate::error::LoadError;

use super::chunk::{BlockGrid, ChunkCoord};

/// A source of previously saved chunks.
pub trait ChunkLoader: Send + Sync {
    /// Loads the blocks of `coord`.
    fn load(&self, coord: ChunkCoord) -> Result<BlockGrid, LoadError>;
}

/// The disk loader. Always misses.
#[derive(Clone, Debug, Default)]
pub struct DiskChunkLoader;

impl ChunkLoader for DiskChunkLoader {
    fn load(&self, coord: ChunkCoord) -> Result<BlockGrid, LoadError> {
        debug!("No saved data for chunk {coord}, falling back to generation");
        Err(LoadError::NotImplemented {
            x: coord.x,
            z: coord.z,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disk_loads_are_not_implemented() {
        assert_eq!(
            DiskChunkLoader.load(ChunkCoord::new(3, -4)),
            Err(LoadError::NotImplemented { x: 3, z: -4 })
        );
    }
}
