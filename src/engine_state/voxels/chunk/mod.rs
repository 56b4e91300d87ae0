//! # Chunk Module
//!
//! This module provides the `Chunk` struct and related functionality for managing
//! 16x256x16 columns of voxel data, together with the coordinate helpers used
//! to move between world, chunk and local block positions.
//!
//! ## Storage
//!
//! Blocks are stored densely, one `BlockType` byte per voxel, in a flat array
//! ordered X fastest, then Z, then Y:
//!
//! ```text
//! index = x + 16 * (z + 16 * y)
//! ```
//!
//! This is the same order used by the chunk wire format, so encoding a chunk is
//! a straight copy of its block bytes.
//!
//! ## Derived Caches
//!
//! Besides its blocks every chunk owns the data derived from them: the
//! [`LightMap`], the per-texture [`ChunkMesh`] and the merged collision boxes.
//! Light and mesh are recomputed together after every edit; collision boxes are
//! rebuilt lazily on the next collision query after their dirty flag is set.

use cgmath::Point3;
use log::debug;

use super::block::block_face::BlockFace;
use super::block::block_type::BlockType;
use super::block::BlockRegistry;
use super::lighting::LightMap;
use super::physics::aabb::Aabb;
use crate::engine_state::rendering::meshing::ChunkMesh;

pub use chunk_state::ChunkState;

pub mod chunk_iteration;
pub mod chunk_state;
pub mod collision;
pub mod neighbors;

/// The width and depth of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The height of a chunk in blocks.
pub const CHUNK_HEIGHT: i32 = 256;
/// Width/depth as a `usize`, for indexing.
pub const CHUNK_SIZE_XZ: usize = CHUNK_DIMENSION as usize;
/// Height as a `usize`, for indexing.
pub const CHUNK_SIZE_Y: usize = CHUNK_HEIGHT as usize;
/// The number of blocks in one horizontal layer.
pub const CHUNK_LAYER_SIZE: usize = CHUNK_SIZE_XZ * CHUNK_SIZE_XZ;
/// The total number of blocks in a chunk.
pub const CHUNK_VOLUME: usize = CHUNK_LAYER_SIZE * CHUNK_SIZE_Y;

/// Flattens local block coordinates into an index into a chunk's storage.
///
/// # Arguments
/// * `x`, `z` - Horizontal coordinates in `0..16`
/// * `y` - Height in `0..256`
#[inline]
pub fn block_index(x: usize, y: usize, z: usize) -> usize {
    x + CHUNK_SIZE_XZ * (z + CHUNK_SIZE_XZ * y)
}

/// Splits a world block coordinate into its chunk coordinate and local offset.
///
/// Uses floor semantics, so `-1` maps to chunk `-1`, local `15`.
#[inline]
pub fn world_to_chunk_local(world: i32) -> (i32, usize) {
    (
        world.div_euclid(CHUNK_DIMENSION),
        world.rem_euclid(CHUNK_DIMENSION) as usize,
    )
}

/// Returns `true` if signed local coordinates address a voxel inside a chunk.
#[inline]
pub fn in_bounds(x: i32, y: i32, z: i32) -> bool {
    (0..CHUNK_DIMENSION).contains(&x)
        && (0..CHUNK_HEIGHT).contains(&y)
        && (0..CHUNK_DIMENSION).contains(&z)
}

/// Integer address of a chunk column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ChunkCoord {
    /// Chunk index along X
    pub x: i32,
    /// Chunk index along Z
    pub z: i32,
}

impl ChunkCoord {
    /// A chunk coordinate.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The chunk containing world block column `(world_x, world_z)`.
    pub fn from_block(world_x: i32, world_z: i32) -> Self {
        Self {
            x: world_x.div_euclid(CHUNK_DIMENSION),
            z: world_z.div_euclid(CHUNK_DIMENSION),
        }
    }

    /// The chunk containing a world-space position.
    pub fn from_position(x: f32, z: f32) -> Self {
        Self::from_block(x.floor() as i32, z.floor() as i32)
    }

    /// Chebyshev distance, the metric the streaming window is defined in.
    pub fn chebyshev_distance(&self, other: ChunkCoord) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }

    /// The horizontally adjacent chunk across `face`. Vertical faces return `self`.
    pub fn neighbor(&self, face: BlockFace) -> ChunkCoord {
        let (dx, _, dz) = face.offset();
        ChunkCoord::new(self.x + dx, self.z + dz)
    }

    /// World block coordinates of this chunk's `(0, _, 0)` corner.
    pub fn world_origin(&self) -> (i32, i32) {
        (self.x * CHUNK_DIMENSION, self.z * CHUNK_DIMENSION)
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Dense block storage for one chunk.
#[derive(Clone, PartialEq, Eq)]
pub struct BlockGrid {
    blocks: Box<[BlockType]>,
}

impl BlockGrid {
    /// A grid filled with air.
    pub fn new() -> Self {
        Self::filled(BlockType::Air)
    }

    /// A grid filled with a single block type.
    pub fn filled(block_type: BlockType) -> Self {
        Self {
            blocks: vec![block_type; CHUNK_VOLUME].into_boxed_slice(),
        }
    }

    /// Wraps an already-flattened block array.
    ///
    /// # Returns
    /// `None` unless `blocks` holds exactly [`CHUNK_VOLUME`] entries.
    pub fn from_vec(blocks: Vec<BlockType>) -> Option<Self> {
        (blocks.len() == CHUNK_VOLUME).then(|| Self {
            blocks: blocks.into_boxed_slice(),
        })
    }

    /// Block at a chunk-local position.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockType {
        self.blocks[block_index(x, y, z)]
    }

    /// Replaces the block at a chunk-local position.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, block_type: BlockType) {
        self.blocks[block_index(x, y, z)] = block_type;
    }

    /// Bounds-checked lookup with signed coordinates.
    ///
    /// # Returns
    /// `None` if any coordinate is outside the chunk.
    #[inline]
    pub fn get_checked(&self, x: i32, y: i32, z: i32) -> Option<BlockType> {
        if in_bounds(x, y, z) {
            Some(self.get(x as usize, y as usize, z as usize))
        } else {
            None
        }
    }

    /// Fills the inclusive vertical range `y_min..=y_max` of every column.
    pub fn fill_layers(&mut self, y_min: usize, y_max: usize, block_type: BlockType) {
        let start = block_index(0, y_min, 0);
        let end = block_index(0, y_max + 1, 0).min(CHUNK_VOLUME);
        self.blocks[start..end].fill(block_type);
    }

    /// The block array in storage order.
    pub fn as_slice(&self) -> &[BlockType] {
        &self.blocks
    }
}

impl Default for BlockGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BlockGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let non_air = self.blocks.iter().filter(|b| **b != BlockType::Air).count();
        f.debug_struct("BlockGrid").field("non_air", &non_air).finish()
    }
}

/// Snapshot of a chunk's blocks handed to a light/mesh pass.
pub struct RelightInput {
    /// Copy of the blocks
    pub blocks: BlockGrid,
    /// Block revision the snapshot was taken at
    pub revision: u64,
}

/// Represents a 16x256x16 column of voxel blocks in the world.
///
/// A chunk owns its blocks and every cache derived from them. It is shared
/// between the world and the worker building it through an
/// [`MtResource`](crate::core::MtResource), and its [`ChunkState`] records
/// how far that build has progressed.
#[derive(Debug)]
pub struct Chunk {
    coord: ChunkCoord,
    state: ChunkState,
    blocks: BlockGrid,
    light: LightMap,
    light_computed: bool,
    mesh: ChunkMesh,
    upload_pending: bool,
    collision_boxes: Vec<Aabb>,
    collision_dirty: bool,
    revision: u64,
}

impl Chunk {
    /// Creates a new, empty chunk in the [`ChunkState::Unlit`] state.
    ///
    /// # Arguments
    /// * `coord` - The chunk coordinates of the new chunk
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            state: ChunkState::Unlit,
            blocks: BlockGrid::new(),
            light: LightMap::new(),
            light_computed: false,
            mesh: ChunkMesh::default(),
            upload_pending: false,
            collision_boxes: Vec::new(),
            collision_dirty: true,
            revision: 0,
        }
    }

    /// Position of the chunk in the world.
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &ChunkState {
        &self.state
    }

    /// Current blocks.
    pub fn blocks(&self) -> &BlockGrid {
        &self.blocks
    }

    /// Light from the last finished pass.
    pub fn light(&self) -> &LightMap {
        &self.light
    }

    /// Whether the light map holds a computed result.
    pub fn is_light_computed(&self) -> bool {
        self.light_computed
    }

    /// Mesh from the last finished pass.
    pub fn mesh(&self) -> &ChunkMesh {
        &self.mesh
    }

    /// Counter bumped on every block change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the block at local coordinates; air if out of bounds.
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> BlockType {
        self.blocks.get_checked(x, y, z).unwrap_or(BlockType::Air)
    }

    /// Marks the start of terrain production.
    ///
    /// # Returns
    /// `false` if the chunk is not waiting for terrain.
    pub fn begin_generation(&mut self) -> bool {
        match self.state {
            ChunkState::Unlit | ChunkState::Awaiting => {
                self.state = ChunkState::Generating;
                true
            }
            _ => false,
        }
    }

    /// Marks the chunk as requested from a remote authority.
    pub fn mark_awaiting(&mut self) {
        if matches!(self.state, ChunkState::Unlit) {
            self.state = ChunkState::Awaiting;
        }
    }

    /// Installs freshly produced terrain and moves the chunk to [`ChunkState::Lighting`].
    ///
    /// # Returns
    /// `false` if the chunk was not expecting terrain; the blocks are dropped.
    pub fn install_blocks(&mut self, blocks: BlockGrid) -> bool {
        if !self.state.is_pending() {
            return false;
        }
        self.blocks = blocks;
        self.revision += 1;
        self.collision_dirty = true;
        self.state = ChunkState::Lighting;
        true
    }

    /// Writes a block at local coordinates.
    ///
    /// Edits only apply once terrain is present. A successful edit bumps the
    /// revision, dirties the collision cache and moves a ready chunk to
    /// [`ChunkState::Dirty`]; a chunk mid-lighting notices the new revision
    /// when its pass finishes.
    ///
    /// # Returns
    /// `true` if the block was written.
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, block_type: BlockType) -> bool {
        if !self.state.has_blocks() {
            debug!(
                "Rejected edit at ({x}, {y}, {z}) in chunk {} while {}",
                self.coord, self.state
            );
            return false;
        }
        self.blocks.set(x, y, z, block_type);
        self.revision += 1;
        self.collision_dirty = true;
        self.mark_dirty();
        true
    }

    /// Flags a ready chunk for a light/mesh recompute.
    pub fn mark_dirty(&mut self) {
        if matches!(self.state, ChunkState::Ready) {
            self.state = ChunkState::Dirty;
        }
    }

    /// Starts a light/mesh pass, returning the blocks it should read.
    ///
    /// # Returns
    /// `None` unless terrain is present.
    pub fn begin_relight(&mut self) -> Option<RelightInput> {
        if !self.state.has_blocks() {
            return None;
        }
        self.state = ChunkState::Lighting;
        Some(RelightInput {
            blocks: self.blocks.clone(),
            revision: self.revision,
        })
    }

    /// Stores the result of a light/mesh pass started at `revision`.
    ///
    /// If the blocks changed while the pass ran the chunk lands in
    /// [`ChunkState::Dirty`] so the newer edit gets its own pass.
    ///
    /// # Returns
    /// The resulting state.
    pub fn finish_relight(&mut self, light: LightMap, mesh: ChunkMesh, revision: u64) -> ChunkState {
        if self.state != ChunkState::Lighting {
            return self.state.clone();
        }
        self.light = light;
        self.light_computed = true;
        self.mesh = mesh;
        self.upload_pending = true;
        self.state = if revision == self.revision {
            ChunkState::Ready
        } else {
            ChunkState::Dirty
        };
        self.state.clone()
    }

    /// Permanently fails this chunk instance.
    pub fn mark_errored(&mut self, reason: impl Into<String>) {
        self.state = ChunkState::Errored(reason.into());
        self.upload_pending = false;
    }

    /// Abandons an unfinished build.
    pub fn mark_cancelled(&mut self) {
        if !self.state.is_terminal() {
            self.state = ChunkState::Cancelled;
            self.upload_pending = false;
        }
    }

    /// Takes the "mesh changed since last upload" flag.
    pub fn take_upload(&mut self) -> bool {
        std::mem::take(&mut self.upload_pending)
    }

    /// Whether the mesh changed since the last [`Self::take_upload`].
    pub fn is_upload_pending(&self) -> bool {
        self.upload_pending
    }

    /// Whether block edits invalidated the collision boxes.
    pub fn is_collision_dirty(&self) -> bool {
        self.collision_dirty
    }

    /// Merged collision boxes in chunk-local coordinates.
    pub fn collision_boxes(&self) -> &[Aabb] {
        &self.collision_boxes
    }

    /// Re-runs the greedy box merge over the current blocks and clears the dirty flag.
    pub fn rebuild_collision(&mut self, registry: &BlockRegistry) {
        self.collision_boxes = collision::build_collision_boxes(&self.blocks, registry);
        self.collision_dirty = false;
    }

    /// World-space bounds of the whole column.
    pub fn world_bounds(&self) -> Aabb {
        let (x, z) = self.coord.world_origin();
        Aabb::new(
            Point3::new(x as f32, 0.0, z as f32),
            Point3::new(
                (x + CHUNK_DIMENSION) as f32,
                CHUNK_HEIGHT as f32,
                (z + CHUNK_DIMENSION) as f32,
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_coordinates_floor() {
        assert_eq!(world_to_chunk_local(-1), (-1, 15));
        assert_eq!(world_to_chunk_local(-16), (-1, 0));
        assert_eq!(world_to_chunk_local(-17), (-2, 15));
        assert_eq!(world_to_chunk_local(16), (1, 0));
        assert_eq!(ChunkCoord::from_position(-0.5, 15.9), ChunkCoord::new(-1, 0));
    }

    #[test]
    fn index_is_x_then_z_then_y() {
        assert_eq!(block_index(1, 0, 0), 1);
        assert_eq!(block_index(0, 0, 1), 16);
        assert_eq!(block_index(0, 1, 0), 256);
        assert_eq!(block_index(15, 255, 15), CHUNK_VOLUME - 1);
    }

    #[test]
    fn edits_require_terrain() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0));
        assert!(!chunk.set_block(0, 0, 0, BlockType::Stone));

        assert!(chunk.begin_generation());
        assert!(chunk.install_blocks(BlockGrid::new()));
        assert!(chunk.set_block(0, 0, 0, BlockType::Stone));
        assert_eq!(chunk.block_at(0, 0, 0), BlockType::Stone);
    }

    #[test]
    fn edit_during_lighting_ends_dirty() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0));
        chunk.begin_generation();
        chunk.install_blocks(BlockGrid::new());

        let input = chunk.begin_relight().unwrap();
        chunk.set_block(1, 1, 1, BlockType::Dirt);
        let state = chunk.finish_relight(LightMap::new(), ChunkMesh::default(), input.revision);
        assert_eq!(state, ChunkState::Dirty);

        let input = chunk.begin_relight().unwrap();
        let state = chunk.finish_relight(LightMap::new(), ChunkMesh::default(), input.revision);
        assert_eq!(state, ChunkState::Ready);
        assert!(chunk.take_upload());
        assert!(!chunk.take_upload());
    }

    #[test]
    fn cancelled_chunk_ignores_terrain() {
        let mut chunk = Chunk::new(ChunkCoord::new(3, -2));
        chunk.begin_generation();
        chunk.mark_cancelled();
        assert!(!chunk.install_blocks(BlockGrid::filled(BlockType::Stone)));
        assert_eq!(chunk.block_at(0, 0, 0), BlockType::Air);
    }
}
