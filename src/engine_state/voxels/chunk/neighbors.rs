//! # Neighbor Edges
//!
//! A read-only copy of the boundary planes of the four horizontally adjacent
//! chunks, taken before a light/mesh pass starts. Each neighbor is locked for
//! reading only while its plane is copied, so a pass never holds two chunk
//! locks at once.

use bitvec::prelude::*;

use crate::core::MtResource;
use crate::engine_state::voxels::block::block_face::BlockFace;
use crate::engine_state::voxels::block::BlockRegistry;
use crate::engine_state::voxels::lighting::LightChannel;

use super::{Chunk, ChunkCoord, CHUNK_DIMENSION, CHUNK_SIZE_XZ, CHUNK_SIZE_Y};

const EDGE_PLANE_SIZE: usize = CHUNK_SIZE_XZ * CHUNK_SIZE_Y;

/// The boundary plane of one neighbor chunk, as seen from across the seam.
#[derive(Clone, Debug)]
pub struct NeighborEdge {
    occluding: BitVec,
    sky: Vec<u8>,
    block: Vec<u8>,
}

impl NeighborEdge {
    /// Copies the plane of `chunk` that touches the chunk on its `facing` side.
    ///
    /// # Arguments
    /// * `chunk` - The neighbor being read
    /// * `facing` - Direction from the neighbor towards the chunk being built
    /// * `registry` - Decides which blocks occlude
    pub fn capture(chunk: &Chunk, facing: BlockFace, registry: &BlockRegistry) -> Self {
        let mut occluding = bitvec![0; EDGE_PLANE_SIZE];
        let mut sky = vec![0; EDGE_PLANE_SIZE];
        let mut block = vec![0; EDGE_PLANE_SIZE];
        let last = CHUNK_SIZE_XZ - 1;

        for y in 0..CHUNK_SIZE_Y {
            for i in 0..CHUNK_SIZE_XZ {
                let (x, z) = match facing {
                    BlockFace::East => (last, i),
                    BlockFace::West => (0, i),
                    BlockFace::South => (i, last),
                    BlockFace::North => (i, 0),
                    BlockFace::Top | BlockFace::Bottom => continue,
                };
                let slot = i + CHUNK_SIZE_XZ * y;
                occluding.set(slot, registry.occludes(chunk.blocks().get(x, y, z)));
                sky[slot] = chunk.light().get(LightChannel::Sky, x, y, z);
                block[slot] = chunk.light().get(LightChannel::Block, x, y, z);
            }
        }

        Self {
            occluding,
            sky,
            block,
        }
    }
}

/// Boundary planes of the (up to) four resident horizontal neighbors.
#[derive(Clone, Debug, Default)]
pub struct NeighborEdges {
    edges: [Option<NeighborEdge>; 4],
}

fn slot_of(face: BlockFace) -> Option<usize> {
    match face {
        BlockFace::North => Some(0),
        BlockFace::South => Some(1),
        BlockFace::East => Some(2),
        BlockFace::West => Some(3),
        BlockFace::Top | BlockFace::Bottom => None,
    }
}

/// Maps a local coordinate one step outside the X/Z range to the neighbor it
/// falls into and its position along that neighbor's edge.
fn locate(x: i32, z: i32) -> Option<(BlockFace, usize)> {
    let inside = |v: i32| (0..CHUNK_DIMENSION).contains(&v);
    match (x, z) {
        (-1, z) if inside(z) => Some((BlockFace::West, z as usize)),
        (CHUNK_DIMENSION, z) if inside(z) => Some((BlockFace::East, z as usize)),
        (x, -1) if inside(x) => Some((BlockFace::North, x as usize)),
        (x, CHUNK_DIMENSION) if inside(x) => Some((BlockFace::South, x as usize)),
        _ => None,
    }
}

impl NeighborEdges {
    /// No neighbors resident.
    pub fn none() -> Self {
        Self::default()
    }

    /// Reads the edges of every resident neighbor of `coord`.
    ///
    /// # Arguments
    /// * `coord` - The chunk about to be lit and meshed
    /// * `registry` - Decides which blocks occlude
    /// * `lookup` - Resolves a coordinate to a resident chunk
    pub fn capture<F>(coord: ChunkCoord, registry: &BlockRegistry, lookup: F) -> Self
    where
        F: Fn(ChunkCoord) -> Option<MtResource<Chunk>>,
    {
        let mut edges = Self::default();
        for face in BlockFace::horizontal() {
            if let Some(neighbor) = lookup(coord.neighbor(face)) {
                let edge = NeighborEdge::capture(&neighbor.get(), face.opposite(), registry);
                edges.set(face, edge);
            }
        }
        edges
    }

    /// Installs the edge seen across `face`.
    pub fn set(&mut self, face: BlockFace, edge: NeighborEdge) {
        if let Some(slot) = slot_of(face) {
            self.edges[slot] = Some(edge);
        }
    }

    /// The edge seen across `face`, if that neighbor is resident.
    pub fn edge(&self, face: BlockFace) -> Option<&NeighborEdge> {
        slot_of(face).and_then(|slot| self.edges[slot].as_ref())
    }

    fn sample(&self, x: i32, y: i32, z: i32) -> Option<(&NeighborEdge, usize)> {
        if !(0..CHUNK_SIZE_Y as i32).contains(&y) {
            return None;
        }
        let (face, i) = locate(x, z)?;
        self.edge(face)
            .map(|edge| (edge, i + CHUNK_SIZE_XZ * y as usize))
    }

    /// Whether the neighbor voxel at out-of-chunk local `(x, y, z)` hides faces.
    ///
    /// Non-resident neighbors never occlude.
    pub fn occludes(&self, x: i32, y: i32, z: i32) -> bool {
        self.sample(x, y, z)
            .map(|(edge, slot)| edge.occluding[slot])
            .unwrap_or(false)
    }

    /// Light stored by the neighbor at out-of-chunk local `(x, y, z)`; 0 if not resident.
    pub fn light(&self, channel: LightChannel, x: i32, y: i32, z: i32) -> u8 {
        self.sample(x, y, z)
            .map(|(edge, slot)| match channel {
                LightChannel::Sky => edge.sky[slot],
                LightChannel::Block => edge.block[slot],
            })
            .unwrap_or(0)
    }
}
