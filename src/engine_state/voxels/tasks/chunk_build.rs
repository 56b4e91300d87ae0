//! The light and mesh stage of a chunk build.
//!
//! A pass never holds more than one chunk lock at a time:
//!
//! 1. Under the chunk's write lock, snapshot its blocks and revision.
//! 2. Copy the boundary planes of the resident neighbors, read-locking each
//!    neighbor only while its plane is copied.
//! 3. Compute light and the mesh with no lock held.
//! 4. Under the write lock again, store the result. If the chunk was edited
//!    in the meantime it lands in `Dirty` and needs another pass.

use log::trace;

use crate::core::MtResource;
use crate::engine_state::rendering::meshing::build_chunk_mesh;
use crate::engine_state::task_management::CancellationToken;
use crate::engine_state::voxels::block::BlockRegistry;
use crate::engine_state::voxels::chunk::neighbors::NeighborEdges;
use crate::engine_state::voxels::chunk::{Chunk, ChunkState};
use crate::engine_state::voxels::lighting::compute_light;
use crate::engine_state::voxels::world::chunk_table::ChunkTable;

/// How a light/mesh pass ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RelightOutcome {
    /// Light and mesh are current
    Ready,
    /// The blocks changed during the pass; another pass is needed
    Dirty,
    /// The chunk had no terrain, or was already finished elsewhere
    Skipped,
    /// The job was cancelled; nothing was stored
    Cancelled,
}

fn cancelled(token: Option<&CancellationToken>) -> bool {
    token.map(CancellationToken::is_cancelled).unwrap_or(false)
}

/// Recomputes light and mesh of one chunk from scratch.
///
/// # Arguments
/// * `chunk` - The chunk to rebuild
/// * `chunks` - Resident chunks, for neighbor boundary planes
/// * `registry` - Block properties
/// * `token` - Checked between stages when the pass belongs to a cancellable job
pub fn relight_chunk(
    chunk: &MtResource<Chunk>,
    chunks: &ChunkTable,
    registry: &BlockRegistry,
    token: Option<&CancellationToken>,
) -> RelightOutcome {
    let (coord, input) = {
        let mut guard = chunk.get_mut();
        (guard.coord(), guard.begin_relight())
    };
    let Some(input) = input else {
        return RelightOutcome::Skipped;
    };

    let neighbors = NeighborEdges::capture(coord, registry, |neighbor| chunks.get(neighbor));
    let light = compute_light(&input.blocks, registry, &neighbors);
    if cancelled(token) {
        return RelightOutcome::Cancelled;
    }

    let mesh = build_chunk_mesh(&input.blocks, &light, &neighbors, registry);
    if cancelled(token) {
        return RelightOutcome::Cancelled;
    }

    trace!("Chunk {coord} meshed: {:?}", mesh);
    match chunk.get_mut().finish_relight(light, mesh, input.revision) {
        ChunkState::Ready => RelightOutcome::Ready,
        ChunkState::Dirty => RelightOutcome::Dirty,
        ChunkState::Cancelled => RelightOutcome::Cancelled,
        _ => RelightOutcome::Skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use crate::engine_state::voxels::chunk::{BlockGrid, ChunkCoord};
    use crate::engine_state::voxels::lighting::MAX_LIGHT_LEVEL;

    fn installed(coord: ChunkCoord, blocks: BlockGrid) -> MtResource<Chunk> {
        let chunk = MtResource::new(Chunk::new(coord));
        chunk.get_mut().begin_generation();
        chunk.get_mut().install_blocks(blocks);
        chunk
    }

    #[test]
    fn pass_lights_and_meshes() {
        let table = ChunkTable::new();
        let registry = BlockRegistry::default();
        let mut blocks = BlockGrid::new();
        blocks.fill_layers(0, 10, BlockType::Stone);
        let chunk = installed(ChunkCoord::new(0, 0), blocks);

        assert_eq!(relight_chunk(&chunk, &table, &registry, None), RelightOutcome::Ready);
        let guard = chunk.get();
        assert_eq!(guard.light().sky(4, 11, 4), MAX_LIGHT_LEVEL);
        assert_eq!(guard.light().sky(4, 5, 4), 0);
        assert!(!guard.mesh().is_empty());
        assert!(guard.is_upload_pending());
    }

    #[test]
    fn cancelled_pass_stores_nothing() {
        let table = ChunkTable::new();
        let registry = BlockRegistry::default();
        let chunk = installed(ChunkCoord::new(1, 1), BlockGrid::filled(BlockType::Dirt));
        let token = CancellationToken::new();
        token.cancel();

        assert_eq!(
            relight_chunk(&chunk, &table, &registry, Some(&token)),
            RelightOutcome::Cancelled
        );
        assert!(!chunk.get().is_light_computed());
    }

    #[test]
    fn chunk_without_terrain_is_skipped() {
        let table = ChunkTable::new();
        let chunk = MtResource::new(Chunk::new(ChunkCoord::new(0, 0)));
        assert_eq!(
            relight_chunk(&chunk, &table, &BlockRegistry::default(), None),
            RelightOutcome::Skipped
        );
    }
}
