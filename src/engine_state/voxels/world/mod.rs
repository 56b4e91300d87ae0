//! # World Module
//!
//! [`VoxelWorld`] owns the resident chunks, the entities and the policy that
//! decides where a chunk's terrain comes from. It is driven from one thread
//! (the fixed-step loop); the chunks it owns are built concurrently by the
//! worker pool through the tasks it hands out.
//!
//! ## Coordinates
//!
//! World block coordinates map to chunks by floor division and to local
//! coordinates by floor modulo, so `x = -1` lives in chunk `-1` at local
//! `15`. Heights outside `0..256` and chunks that are not resident read as
//! air.
//!
//! ## Chunk Sources
//!
//! * [`ChunkSource::Local`] asks the disk loader first and generates the
//!   terrain on a worker when it misses (it always does).
//! * [`ChunkSource::Network`] sends a request through a [`ChunkRequester`]
//!   and leaves the chunk `Awaiting` until
//!   [`VoxelWorld::apply_chunk_payload`] delivers its blocks.
//!
//! ## Edits
//!
//! [`VoxelWorld::set_block_at`] relights and remeshes the edited chunk on the
//! calling thread, and its horizontal neighbor too when the edited voxel sits
//! on their shared boundary. Chunks edited while a worker is lighting them
//! end up `Dirty` and are rebuilt by [`VoxelWorld::flush_dirty`].

pub mod chunk_table;
pub mod collision;
pub mod entities;
pub mod streaming;

use std::sync::Arc;

use cgmath::{Point3, Vector3};
use log::{debug, info};

use crate::config::WorldConfig;
use crate::core::MtResource;
use crate::engine_state::network::{decode_chunk_data, ChunkRequester};
use crate::engine_state::task_management::task::Task;
use crate::engine_state::task_management::CancellationToken;
use crate::error::WorldError;

use super::block::block_face::BlockFace;
use super::block::block_type::BlockType;
use super::block::{BlockDescriptor, BlockRegistry};
use super::chunk::{world_to_chunk_local, Chunk, ChunkCoord, ChunkState, CHUNK_DIMENSION, CHUNK_HEIGHT};
use super::generation::{ChunkGenerator, TerrainGenerator};
use super::physics::aabb::{Aabb, Contact};
use super::physics::entity::{Entity, EntityId};
use super::physics::TickReport;
use super::storage::{ChunkLoader, DiskChunkLoader};
use super::tasks::{relight_chunk, ChunkGenerationTask, RelightOutcome};

use chunk_table::ChunkTable;
use entities::EntityStore;
pub use streaming::StreamingUpdate;

/// Where the terrain of newly created chunks comes from.
#[derive(Clone, Default)]
pub enum ChunkSource {
    /// Load from disk, else generate on a worker
    #[default]
    Local,
    /// Request from a remote authority
    Network(Arc<dyn ChunkRequester>),
}

impl std::fmt::Debug for ChunkSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkSource::Local => write!(f, "Local"),
            ChunkSource::Network(_) => write!(f, "Network"),
        }
    }
}

/// A streaming voxel world.
pub struct VoxelWorld {
    chunks: ChunkTable,
    registry: Arc<BlockRegistry>,
    generator: Arc<dyn ChunkGenerator>,
    loader: Box<dyn ChunkLoader>,
    source: ChunkSource,
    streaming_radius: i32,
    gravity: f32,
    entities: EntityStore,
    player: Option<EntityId>,
    center: Option<ChunkCoord>,
    /// Build jobs waiting to be handed to the worker pool
    outbox: Vec<Box<dyn Task + Send>>,
    /// Evicted chunks whose render resources still need releasing
    released: Vec<ChunkCoord>,
}

impl VoxelWorld {
    /// Creates an empty world generating terrain as configured.
    pub fn new(config: &WorldConfig) -> Self {
        Self::with_generator(config, Arc::new(TerrainGenerator::from_config(config)))
    }

    /// Creates an empty world with a custom terrain source.
    pub fn with_generator(config: &WorldConfig, generator: Arc<dyn ChunkGenerator>) -> Self {
        Self {
            chunks: ChunkTable::new(),
            registry: Arc::new(BlockRegistry::default()),
            generator,
            loader: Box::new(DiskChunkLoader),
            source: ChunkSource::Local,
            streaming_radius: config.streaming_radius,
            gravity: config.gravity,
            entities: EntityStore::new(),
            player: None,
            center: None,
            outbox: Vec::new(),
            released: Vec::new(),
        }
    }

    /// Replaces the block registry. Only meaningful before any chunk is built.
    pub fn with_registry(mut self, registry: BlockRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Replaces the disk loader.
    pub fn with_loader(mut self, loader: Box<dyn ChunkLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// The block registry the world was built with.
    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    /// Resident chunks.
    pub fn chunks(&self) -> &ChunkTable {
        &self.chunks
    }

    /// Where new chunks get their terrain.
    pub fn source(&self) -> &ChunkSource {
        &self.source
    }

    /// Radius in chunks kept resident around the player.
    pub fn streaming_radius(&self) -> i32 {
        self.streaming_radius
    }

    /// Shared handle to a resident chunk.
    pub fn chunk(&self, coord: ChunkCoord) -> Option<MtResource<Chunk>> {
        self.chunks.get(coord)
    }

    /// State of a resident chunk, `None` if not resident.
    pub fn chunk_state(&self, coord: ChunkCoord) -> Option<ChunkState> {
        self.chunks.get(coord).map(|chunk| chunk.get().state().clone())
    }

    /// Number of resident chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Chunk the streaming window was last centered on.
    pub fn center(&self) -> Option<ChunkCoord> {
        self.center
    }

    /// Chooses the chunk source, spawns the player and streams in the
    /// window around it.
    ///
    /// # Arguments
    /// * `source` - Local generation or remote requests
    /// * `spawn` - Player spawn position
    pub fn start(&mut self, source: ChunkSource, spawn: Point3<f32>) -> StreamingUpdate {
        info!("Starting world ({source:?}) with player at {spawn:?}");
        self.source = source;
        let player = self.entities.spawn_player(spawn);
        self.player = Some(player);
        self.update_streaming(ChunkCoord::from_position(spawn.x, spawn.z))
    }

    /// Returns the descriptor of the block at world coordinates.
    ///
    /// Air for heights outside the world and for chunks that are not resident.
    pub fn get_block_at(&self, x: i32, y: i32, z: i32) -> &BlockDescriptor {
        self.registry.descriptor(self.block_type_at(x, y, z))
    }

    /// Returns the type of the block at world coordinates; see [`Self::get_block_at`].
    pub fn block_type_at(&self, x: i32, y: i32, z: i32) -> BlockType {
        if !(0..CHUNK_HEIGHT).contains(&y) {
            return BlockType::Air;
        }
        let (chunk_x, local_x) = world_to_chunk_local(x);
        let (chunk_z, local_z) = world_to_chunk_local(z);
        self.chunks
            .get(ChunkCoord::new(chunk_x, chunk_z))
            .map(|chunk| chunk.get().block_at(local_x as i32, y, local_z as i32))
            .unwrap_or(BlockType::Air)
    }

    /// Writes a block at world coordinates and rebuilds what it affects.
    ///
    /// # Returns
    /// `Ok(true)` if the block was written, `Ok(false)` if the height is out
    /// of range or the chunk has no terrain yet.
    ///
    /// # Errors
    /// [`WorldError::ChunkNotResident`] or [`WorldError::ChunkErrored`].
    pub fn set_block_at(&mut self, x: i32, y: i32, z: i32, block_type: BlockType) -> Result<bool, WorldError> {
        if !(0..CHUNK_HEIGHT).contains(&y) {
            debug!("Ignoring edit at ({x}, {y}, {z}): height out of range");
            return Ok(false);
        }
        let (chunk_x, local_x) = world_to_chunk_local(x);
        let (chunk_z, local_z) = world_to_chunk_local(z);
        let coord = ChunkCoord::new(chunk_x, chunk_z);
        let chunk = self.chunks.get(coord).ok_or(WorldError::ChunkNotResident {
            x: coord.x,
            z: coord.z,
        })?;

        {
            let mut guard = chunk.get_mut();
            if let ChunkState::Errored(reason) = guard.state() {
                return Err(WorldError::ChunkErrored {
                    x: coord.x,
                    z: coord.z,
                    reason: reason.clone(),
                });
            }
            if !guard.set_block(local_x, y as usize, local_z, block_type) {
                return Ok(false);
            }
        }

        let mut affected = vec![chunk];
        for face in boundary_faces(local_x, local_z) {
            if let Some(neighbor) = self.chunks.get(coord.neighbor(face)) {
                neighbor.get_mut().mark_dirty();
                affected.push(neighbor);
            }
        }
        for chunk in &affected {
            self.relight_if_dirty(chunk);
        }
        Ok(true)
    }

    fn relight_if_dirty(&self, chunk: &MtResource<Chunk>) -> RelightOutcome {
        if *chunk.get().state() != ChunkState::Dirty {
            return RelightOutcome::Skipped;
        }
        relight_chunk(chunk, &self.chunks, &self.registry, None)
    }

    /// Rebuilds every `Dirty` chunk on the calling thread.
    ///
    /// # Returns
    /// The number of chunks rebuilt.
    pub fn flush_dirty(&mut self) -> usize {
        self.chunks
            .snapshot()
            .iter()
            .filter(|(_, chunk)| self.relight_if_dirty(chunk) != RelightOutcome::Skipped)
            .count()
    }

    /// Tests a box against the terrain and every collidable entity except `exclude`.
    pub fn check_collision(&self, moving: &Aabb, exclude: Option<EntityId>) -> Option<Contact> {
        let bodies = self.entities.collision_bodies();
        collision::find_contact(&self.chunks, &self.registry, &bodies, moving, exclude)
    }

    /// Moves the streaming window to `center`: evicts chunks that left it and
    /// creates the ones that entered it.
    pub fn update_streaming(&mut self, center: ChunkCoord) -> StreamingUpdate {
        let update = streaming::plan(center, self.streaming_radius, &self.chunks.coords());

        for coord in &update.evicted {
            self.evict(*coord);
        }
        for coord in &update.created {
            self.create(*coord);
        }
        self.center = Some(center);

        info!(
            "Streaming around {center}: {} evicted, {} created, {} resident",
            update.evicted.len(),
            update.created.len(),
            self.chunks.len()
        );
        update
    }

    fn evict(&mut self, coord: ChunkCoord) {
        let Some(entry) = self.chunks.remove(coord) else {
            return;
        };
        entry.job.cancel();

        let mut chunk = entry.chunk.get_mut();
        if chunk.state().is_pending() || *chunk.state() == ChunkState::Lighting {
            debug!("Cancelled build of chunk {coord} ({})", chunk.state());
        }
        chunk.mark_cancelled();
        self.released.push(coord);
    }

    fn create(&mut self, coord: ChunkCoord) {
        let Some((chunk, job)) = self.chunks.insert(coord) else {
            return;
        };

        match &self.source {
            ChunkSource::Network(requester) => {
                chunk.get_mut().mark_awaiting();
                requester.request_chunk(coord);
            }
            ChunkSource::Local => match self.loader.load(coord) {
                Ok(blocks) => {
                    let installed = {
                        let mut guard = chunk.get_mut();
                        guard.begin_generation() && guard.install_blocks(blocks)
                    };
                    if installed {
                        self.queue_build(chunk, job, false);
                    }
                }
                Err(_) => self.queue_build(chunk, job, true),
            },
        }
    }

    fn queue_build(&mut self, chunk: MtResource<Chunk>, job: CancellationToken, generate: bool) {
        let task = ChunkGenerationTask::new(chunk, self.chunks.clone(), self.registry.clone(), job);
        let task = if generate {
            task.generating_with(self.generator.clone())
        } else {
            task
        };
        self.outbox.push(Box::new(task));
    }

    /// Installs a chunk data payload received from the authority and queues
    /// its light and mesh build.
    ///
    /// # Returns
    /// The chunk the payload was applied to, or `None` if that chunk is not
    /// resident or not waiting for terrain.
    ///
    /// # Errors
    /// [`WorldError::Decode`] for a malformed payload.
    pub fn apply_chunk_payload(&mut self, bytes: &[u8]) -> Result<Option<ChunkCoord>, WorldError> {
        let data = decode_chunk_data(bytes)?;
        let Some(entry) = self.chunks.entry(data.coord) else {
            debug!("Ignoring payload for non-resident chunk {}", data.coord);
            return Ok(None);
        };

        let installed = {
            let mut chunk = entry.chunk.get_mut();
            chunk.begin_generation() && chunk.install_blocks(data.blocks)
        };
        if !installed {
            debug!("Chunk {} was not waiting for terrain, payload dropped", data.coord);
            return Ok(None);
        }

        self.queue_build(entry.chunk, entry.job, false);
        Ok(Some(data.coord))
    }

    /// Permanently fails a resident chunk.
    pub fn mark_errored(&self, coord: ChunkCoord, reason: impl Into<String>) -> Result<(), WorldError> {
        let chunk = self.chunks.get(coord).ok_or(WorldError::ChunkNotResident {
            x: coord.x,
            z: coord.z,
        })?;
        chunk.get_mut().mark_errored(reason);
        Ok(())
    }

    /// Build jobs created since the last call, for the worker pool.
    pub fn take_tasks(&mut self) -> Vec<Box<dyn Task + Send>> {
        std::mem::take(&mut self.outbox)
    }

    /// Runs every queued build job on the calling thread.
    ///
    /// # Returns
    /// The number of jobs run.
    pub fn build_pending_now(&mut self) -> usize {
        let mut count = 0;
        while !self.outbox.is_empty() {
            for task in self.take_tasks() {
                let follow_ups = task.process().handle_result();
                self.outbox.extend(follow_ups);
                count += 1;
            }
        }
        count
    }

    /// Evicted chunks since the last call.
    pub fn take_released(&mut self) -> Vec<ChunkCoord> {
        std::mem::take(&mut self.released)
    }

    /// Advances every entity by one fixed step.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let chunks = &self.chunks;
        let registry = &self.registry;
        self.entities.step_all(self.gravity, dt, |bodies, moving, id| {
            collision::find_contact(chunks, registry, bodies, moving, Some(id))
        })
    }

    /// Spawns a prop body.
    pub fn spawn_prop(&mut self, position: Point3<f32>, half_extents: Vector3<f32>) -> EntityId {
        self.entities.spawn_prop(position, half_extents)
    }

    /// Looks up an entity by id.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Mutable lookup by id.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// All entities, the player included.
    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    /// The player body, if one was spawned.
    pub fn player(&self) -> Option<&Entity> {
        self.player.and_then(|id| self.entities.get(id))
    }

    /// Mutable access to the player body.
    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        let id = self.player?;
        self.entities.get_mut(id)
    }

    /// The chunk the player stands in.
    pub fn observer_chunk(&self) -> Option<ChunkCoord> {
        self.player()
            .map(|player| ChunkCoord::from_position(player.position.x, player.position.z))
    }
}

/// Horizontal faces of a chunk that the local column `(x, z)` touches.
fn boundary_faces(x: usize, z: usize) -> Vec<BlockFace> {
    let last = (CHUNK_DIMENSION - 1) as usize;
    let mut faces = Vec::new();
    if x == 0 {
        faces.push(BlockFace::West);
    }
    if x == last {
        faces.push(BlockFace::East);
    }
    if z == 0 {
        faces.push(BlockFace::North);
    }
    if z == last {
        faces.push(BlockFace::South);
    }
    faces
}
