//! # Engine State Module
//!
//! The coordinator that owns the world, the worker pool and the fixed-step
//! clock.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `voxels` - World data, chunk pipeline, generation, lighting and physics
//! * `task_management` - The worker pool chunk builds run on
//! * `rendering` - Mesh export and the render-backend collaborator
//! * `network` - Chunk replication wire format
//!
//! ## Frame Loop
//!
//! The embedding application calls [`EngineState::advance`] once per frame
//! with the elapsed wall time. Time accumulates and is consumed in fixed
//! steps of `1 / tick_rate_hz`; each step moves the entities, re-centers the
//! streaming window when the player crossed into another chunk and rebuilds
//! edited chunks. After the steps, finished worker results are applied and
//! new build jobs are handed out. [`EngineState::drain_render_uploads`] then
//! passes every rebuilt mesh to the renderer.

use std::sync::Arc;

use cgmath::Point3;
use log::{debug, info, warn};
use web_time::Duration;

use crate::config::WorldConfig;
use crate::error::{ConfigError, WorldError};

use network::{ChunkRequester, MsgId, PacketReader};
use rendering::RenderBackend;
use task_management::TaskManager;
use voxels::chunk::ChunkCoord;
use voxels::physics::TickReport;
use voxels::world::{ChunkSource, StreamingUpdate, VoxelWorld};

pub mod network;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// Where the player appears when the world starts.
pub const SPAWN_POSITION: Point3<f32> = Point3 {
    x: 8.5,
    y: 128.0,
    z: 8.5,
};

/// The main state container for the voxel engine.
///
/// # Examples
///
/// ```no_run
/// use voxel_world::{config::WorldConfig, engine_state::{rendering::RecordingBackend, EngineState}};
///
/// let mut engine = EngineState::new(WorldConfig::default()).unwrap();
/// engine.start().unwrap();
/// let mut backend = RecordingBackend::default();
///
/// loop {
///     engine.advance(1.0 / 60.0);
///     engine.drain_render_uploads(&mut backend);
/// }
/// ```
pub struct EngineState {
    config: WorldConfig,
    /// The voxel world containing all chunk data
    world: VoxelWorld,
    /// Task manager for chunk builds
    task_manager: TaskManager,
    requester: Option<Arc<dyn ChunkRequester>>,
    packet_reader: PacketReader,
    /// Unconsumed simulation time in seconds
    accumulator: f64,
    ticks: u64,
    last_report: TickReport,
}

impl EngineState {
    /// Creates an engine with a world built from `config`.
    ///
    /// # Errors
    /// [`WorldError::Config`] if the configuration does not validate.
    pub fn new(config: WorldConfig) -> Result<Self, WorldError> {
        config.validate()?;
        let world = VoxelWorld::new(&config);
        Self::with_world(config, world)
    }

    /// Creates an engine around an already constructed world.
    pub fn with_world(config: WorldConfig, world: VoxelWorld) -> Result<Self, WorldError> {
        config.validate()?;
        let task_manager = TaskManager::new(config.worker_count);
        Ok(Self {
            config,
            world,
            task_manager,
            requester: None,
            packet_reader: PacketReader::new(),
            accumulator: 0.0,
            ticks: 0,
            last_report: TickReport::default(),
        })
    }

    /// Sets the collaborator chunk requests go through in networked mode.
    pub fn with_requester(mut self, requester: Arc<dyn ChunkRequester>) -> Self {
        self.requester = Some(requester);
        self
    }

    /// The configuration the engine was built from.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The voxel world.
    pub fn world(&self) -> &VoxelWorld {
        &self.world
    }

    /// Mutable access to the voxel world.
    pub fn world_mut(&mut self) -> &mut VoxelWorld {
        &mut self.world
    }

    /// The worker pool that runs chunk jobs.
    pub fn task_manager(&self) -> &TaskManager {
        &self.task_manager
    }

    /// Fixed steps run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// What happened during the most recent fixed step.
    pub fn last_report(&self) -> &TickReport {
        &self.last_report
    }

    /// Spawns the player and starts streaming in the world around it.
    ///
    /// # Errors
    /// [`WorldError::Config`] when networked mode is configured without a requester.
    pub fn start(&mut self) -> Result<StreamingUpdate, WorldError> {
        let source = if self.config.network {
            let requester = self.requester.clone().ok_or_else(|| {
                ConfigError::Invalid("networked mode needs a chunk requester".into())
            })?;
            ChunkSource::Network(requester)
        } else {
            ChunkSource::Local
        };

        let update = self.world.start(source, SPAWN_POSITION);
        self.process_tasks();
        Ok(update)
    }

    /// Feeds elapsed wall time into the fixed-step clock.
    ///
    /// The frame time is clamped to `max_frame_time`, so a long stall runs a
    /// bounded number of steps instead of spiralling.
    ///
    /// # Returns
    /// The number of fixed steps run.
    pub fn advance(&mut self, frame_time: f64) -> usize {
        let step = self.config.fixed_time_step();
        self.accumulator += frame_time.clamp(0.0, self.config.max_frame_time);

        let mut steps = 0;
        while self.accumulator >= step {
            self.fixed_update(step);
            self.accumulator -= step;
            steps += 1;
        }

        self.process_tasks();
        steps
    }

    /// Runs one simulation step of `dt` seconds.
    pub fn fixed_update(&mut self, dt: f64) {
        self.last_report = self.world.tick(dt as f32);
        self.ticks += 1;

        if let Some(observer) = self.world.observer_chunk() {
            if self.world.center() != Some(observer) {
                self.world.update_streaming(observer);
            }
        }

        let rebuilt = self.world.flush_dirty();
        if rebuilt > 0 {
            debug!("Rebuilt {rebuilt} dirty chunks");
        }
    }

    /// Applies finished worker results and hands out queued build jobs.
    pub fn process_tasks(&mut self) {
        for task in self.world.take_tasks() {
            self.task_manager.publish_task(task);
        }
        self.task_manager.process_completed_tasks();
        self.task_manager.process_queued_tasks();
    }

    /// Blocks until every build job has finished or `timeout` passes.
    ///
    /// # Returns
    /// `true` if the worker pool went idle in time.
    pub fn run_until_idle(&mut self, timeout: Duration) -> bool {
        self.process_tasks();
        self.task_manager.wait_idle(timeout)
    }

    /// Hands rebuilt chunk meshes to `backend` and releases evicted chunks.
    ///
    /// Each rebuild is uploaded exactly once.
    ///
    /// # Returns
    /// The number of meshes uploaded.
    pub fn drain_render_uploads(&mut self, backend: &mut impl RenderBackend) -> usize {
        for coord in self.world.take_released() {
            backend.release_chunk_mesh(coord);
        }

        let mut uploaded = 0;
        for (coord, chunk) in self.world.chunks().snapshot() {
            let mut chunk = chunk.get_mut();
            if chunk.take_upload() {
                backend.upload_chunk_mesh(coord, chunk.mesh());
                uploaded += 1;
            }
        }
        uploaded
    }

    /// Feeds bytes received from the authority and applies every complete
    /// chunk data packet.
    ///
    /// # Returns
    /// The chunks that received terrain.
    ///
    /// # Errors
    /// [`WorldError::Decode`] for a malformed stream or payload. Chunks
    /// applied before the bad packet stay applied.
    pub fn receive_network_bytes(&mut self, bytes: &[u8]) -> Result<Vec<ChunkCoord>, WorldError> {
        self.packet_reader.push(bytes);
        let mut applied = Vec::new();
        for packet in self.packet_reader.drain_packets()? {
            match packet.msg_id {
                MsgId::ChunkData => {
                    if let Some(coord) = self.world.apply_chunk_payload(&packet.payload)? {
                        applied.push(coord);
                    }
                }
                MsgId::ChunkRequest => warn!("Ignoring chunk request sent to a client"),
            }
        }
        if !applied.is_empty() {
            info!("Received terrain for {} chunks", applied.len());
            self.process_tasks();
        }
        Ok(applied)
    }
}
