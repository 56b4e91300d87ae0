//! # Mesh Exporter
//!
//! Converts a lit chunk into render-ready geometry.
//!
//! Every solid block emits each of its six faces whose neighbor does not
//! occlude. A face becomes two triangles whose vertices all carry the same
//! light term: the sampled face light clamped to `0.1..=1.0`, times the
//! face's fixed directional shading.
//!
//! Faces are grouped into buckets keyed by texture so the render backend can
//! issue one draw per texture per chunk.
//!
//! # Chunk Borders
//! A face on the chunk border looks into the neighbor's edge snapshot. When
//! the neighbor is not resident the face is emitted, so no holes show while
//! chunks stream in.

use std::collections::BTreeMap;

use crate::engine_state::voxels::block::block_face::BlockFace;
use crate::engine_state::voxels::block::{BlockRegistry, TextureId};
use crate::engine_state::voxels::chunk::chunk_iteration::ChunkBlockIterator;
use crate::engine_state::voxels::chunk::neighbors::NeighborEdges;
use crate::engine_state::voxels::chunk::{BlockGrid, CHUNK_HEIGHT};
use crate::engine_state::voxels::lighting::{LightMap, LightSampler};

use super::Vertex;

pub mod face;

/// Lowest light a face is drawn with, so caves are never pitch black.
pub const MIN_FACE_LIGHT: f32 = 0.1;

/// Per-texture vertex buckets of one chunk.
///
/// Each bucket is an index-less triangle list in chunk-local coordinates.
#[derive(Clone, Default, PartialEq)]
pub struct ChunkMesh {
    buckets: BTreeMap<TextureId, Vec<Vertex>>,
}

impl ChunkMesh {
    /// An empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buckets in texture order.
    pub fn buckets(&self) -> impl Iterator<Item = (TextureId, &[Vertex])> {
        self.buckets
            .iter()
            .map(|(texture, vertices)| (*texture, vertices.as_slice()))
    }

    /// Vertices of the faces using `texture`.
    pub fn bucket(&self, texture: TextureId) -> Option<&[Vertex]> {
        self.buckets.get(&texture).map(Vec::as_slice)
    }

    /// Raw bytes of one bucket, ready for a vertex buffer upload.
    ///
    /// # Returns
    /// An empty slice if no face uses `texture`.
    pub fn vertex_bytes(&self, texture: TextureId) -> &[u8] {
        self.bucket(texture)
            .map(bytemuck::cast_slice)
            .unwrap_or(&[])
    }

    /// Vertices across all buckets.
    pub fn vertex_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Number of block faces in the mesh.
    pub fn face_count(&self) -> usize {
        self.vertex_count() / 6
    }

    /// True when no face is visible.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    fn bucket_mut(&mut self, texture: TextureId) -> &mut Vec<Vertex> {
        self.buckets.entry(texture).or_default()
    }
}

impl std::fmt::Debug for ChunkMesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkMesh")
            .field("buckets", &self.buckets.len())
            .field("vertices", &self.vertex_count())
            .finish()
    }
}

/// Whether the voxel at signed local `(x, y, z)` hides the face looking at it.
fn occluded(blocks: &BlockGrid, neighbors: &NeighborEdges, registry: &BlockRegistry, x: i32, y: i32, z: i32) -> bool {
    if !(0..CHUNK_HEIGHT).contains(&y) {
        return false;
    }
    match blocks.get_checked(x, y, z) {
        Some(block_type) => registry.occludes(block_type),
        None => neighbors.occludes(x, y, z),
    }
}

/// Builds the mesh of one chunk.
///
/// # Arguments
/// * `blocks` - The chunk's blocks
/// * `light` - The chunk's computed light
/// * `neighbors` - Edge snapshot of resident neighbors
/// * `registry` - Solidity, occlusion and textures of each block type
///
/// # Returns
/// The texture-bucketed mesh.
pub fn build_chunk_mesh(
    blocks: &BlockGrid,
    light: &LightMap,
    neighbors: &NeighborEdges,
    registry: &BlockRegistry,
) -> ChunkMesh {
    let sampler = LightSampler {
        blocks,
        light,
        neighbors,
        registry,
    };
    let mut mesh = ChunkMesh::new();

    for (position, block_type) in ChunkBlockIterator::new(blocks) {
        if !registry.is_solid(block_type) {
            continue;
        }
        let (x, y, z) = (position.x, position.y, position.z);

        for face in BlockFace::all() {
            let (dx, dy, dz) = face.offset();
            let (nx, ny, nz) = (x as i32 + dx, y as i32 + dy, z as i32 + dz);
            if occluded(blocks, neighbors, registry, nx, ny, nz) {
                continue;
            }

            let dynamic = sampler.face_light(x, y, z, face).clamp(MIN_FACE_LIGHT, 1.0);
            let light_term = dynamic * face.shading_factor();
            let bucket = mesh.bucket_mut(registry.texture(block_type, face));
            face::push_face(bucket, x, y, z, face, light_term);
        }
    }

    mesh
}
