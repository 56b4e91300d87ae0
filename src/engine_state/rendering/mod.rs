//! Rendering side of the voxel engine.
//!
//! The engine does not draw anything itself. It turns chunks into
//! texture-bucketed vertex lists ([`meshing::ChunkMesh`]) and hands them to a
//! [`RenderBackend`], which owns GPU buffers, shaders and draw calls.

use crate::engine_state::voxels::chunk::ChunkCoord;

pub mod meshing;
mod vertex;

// Re-export commonly used types
pub use meshing::ChunkMesh;
pub use vertex::Vertex;

/// Receives chunk geometry from the engine.
///
/// The backend draws each bucket of a chunk mesh as an index-less triangle
/// list with that bucket's texture bound, translated by the chunk's world
/// origin. Camera matrices are the backend's concern.
pub trait RenderBackend {
    /// Replaces the geometry of `coord` with `mesh`.
    fn upload_chunk_mesh(&mut self, coord: ChunkCoord, mesh: &ChunkMesh);

    /// Frees everything held for `coord`.
    fn release_chunk_mesh(&mut self, coord: ChunkCoord);
}

/// A backend that only remembers what it was given. Used by the headless
/// driver and by tests.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    /// Vertex count of the last upload per resident chunk
    pub resident: std::collections::HashMap<ChunkCoord, usize>,
    /// Total uploads received
    pub uploads: usize,
    /// Total releases received
    pub releases: usize,
}

impl RenderBackend for RecordingBackend {
    fn upload_chunk_mesh(&mut self, coord: ChunkCoord, mesh: &ChunkMesh) {
        self.resident.insert(coord, mesh.vertex_count());
        self.uploads += 1;
    }

    fn release_chunk_mesh(&mut self, coord: ChunkCoord) {
        self.resident.remove(&coord);
        self.releases += 1;
    }
}
