//! # Lighting
//!
//! Per-voxel light for a chunk, stored as two independent channels:
//!
//! * **Sky light** comes down from the top of the world and leaks sideways
//!   under overhangs.
//! * **Block light** radiates from blocks with a non-zero light emission.
//!
//! Both channels hold values in `0..=15`. The value used for shading a voxel
//! is the maximum of the two. [`propagation::compute_light`] recomputes a
//! whole chunk from scratch; there is no incremental update.

use crate::engine_state::voxels::block::block_face::BlockFace;
use crate::engine_state::voxels::block::BlockRegistry;
use crate::engine_state::voxels::chunk::neighbors::NeighborEdges;
use crate::engine_state::voxels::chunk::{block_index, in_bounds, BlockGrid, CHUNK_HEIGHT, CHUNK_VOLUME};

pub mod propagation;

pub use propagation::compute_light;

/// Maximum light level (full brightness)
pub const MAX_LIGHT_LEVEL: u8 = 15;

/// Minimum light level (complete darkness)
pub const MIN_LIGHT_LEVEL: u8 = 0;

/// Which of the two light channels a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightChannel {
    /// Sunlight that comes from above
    Sky,
    /// Light emitted by blocks
    Block,
}

/// Light storage for a chunk, indexed like its blocks.
#[derive(Clone, PartialEq, Eq)]
pub struct LightMap {
    sky: Box<[u8]>,
    block: Box<[u8]>,
}

impl LightMap {
    /// A completely dark light map.
    pub fn new() -> Self {
        Self {
            sky: vec![MIN_LIGHT_LEVEL; CHUNK_VOLUME].into_boxed_slice(),
            block: vec![MIN_LIGHT_LEVEL; CHUNK_VOLUME].into_boxed_slice(),
        }
    }

    #[inline]
    fn channel(&self, channel: LightChannel) -> &[u8] {
        match channel {
            LightChannel::Sky => &self.sky,
            LightChannel::Block => &self.block,
        }
    }

    /// Light level of one channel at a chunk-local position.
    #[inline]
    pub fn get(&self, channel: LightChannel, x: usize, y: usize, z: usize) -> u8 {
        self.channel(channel)[block_index(x, y, z)]
    }

    /// Stores a light value, clamped to [`MAX_LIGHT_LEVEL`].
    #[inline]
    pub fn set(&mut self, channel: LightChannel, x: usize, y: usize, z: usize, level: u8) {
        let level = level.min(MAX_LIGHT_LEVEL);
        let index = block_index(x, y, z);
        match channel {
            LightChannel::Sky => self.sky[index] = level,
            LightChannel::Block => self.block[index] = level,
        }
    }

    /// Sky light at a chunk-local position.
    #[inline]
    pub fn sky(&self, x: usize, y: usize, z: usize) -> u8 {
        self.get(LightChannel::Sky, x, y, z)
    }

    /// Block light at a chunk-local position.
    #[inline]
    pub fn block(&self, x: usize, y: usize, z: usize) -> u8 {
        self.get(LightChannel::Block, x, y, z)
    }

    /// The shading value of a voxel: the brighter of its two channels.
    #[inline]
    pub fn total(&self, x: usize, y: usize, z: usize) -> u8 {
        self.sky(x, y, z).max(self.block(x, y, z))
    }

    /// Raw values of one channel in storage order.
    pub fn as_slice(&self, channel: LightChannel) -> &[u8] {
        self.channel(channel)
    }
}

impl Default for LightMap {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LightMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.sky.iter().filter(|level| **level > 0).count();
        let emitted = self.block.iter().filter(|level| **level > 0).count();
        f.debug_struct("LightMap")
            .field("sky_lit", &lit)
            .field("block_lit", &emitted)
            .finish()
    }
}

/// Read access to a chunk's light and blocks plus its neighbors' edges, used
/// to sample the light reaching a block face.
pub struct LightSampler<'a> {
    /// Blocks of the chunk being sampled
    pub blocks: &'a BlockGrid,
    /// Its computed light
    pub light: &'a LightMap,
    /// Light on the facing edges of the four neighbors
    pub neighbors: &'a NeighborEdges,
    /// Decides which blocks let light through
    pub registry: &'a BlockRegistry,
}

impl<'a> LightSampler<'a> {
    /// Total light at signed local coordinates, reaching into neighbor edges.
    ///
    /// Above the world is open sky; below it and in non-resident neighbors is dark.
    fn total_at(&self, x: i32, y: i32, z: i32) -> u8 {
        if y >= CHUNK_HEIGHT {
            return MAX_LIGHT_LEVEL;
        }
        if in_bounds(x, y, z) {
            return self.light.total(x as usize, y as usize, z as usize);
        }
        self.neighbors
            .light(LightChannel::Sky, x, y, z)
            .max(self.neighbors.light(LightChannel::Block, x, y, z))
    }

    /// Returns `true` if the voxel across `face` lets light through.
    ///
    /// Anything outside this chunk counts as exposed.
    fn is_exposed(&self, x: i32, y: i32, z: i32) -> bool {
        match self.blocks.get_checked(x, y, z) {
            Some(block_type) => self.registry.is_transparent(block_type),
            None => true,
        }
    }

    /// Brightness reaching one face of the block at `(x, y, z)`, in `0.0..=1.0`.
    ///
    /// An exposed face takes the light of the voxel it looks into; a face
    /// against another block takes the dimmer of the two voxels.
    pub fn face_light(&self, x: usize, y: usize, z: usize, face: BlockFace) -> f32 {
        let (dx, dy, dz) = face.offset();
        let (x, y, z) = (x as i32, y as i32, z as i32);
        let (sx, sy, sz) = (x + dx, y + dy, z + dz);

        let level = if self.is_exposed(sx, sy, sz) {
            self.total_at(sx, sy, sz)
        } else {
            self.total_at(x, y, z).min(self.total_at(sx, sy, sz))
        };

        level as f32 / MAX_LIGHT_LEVEL as f32
    }
}
