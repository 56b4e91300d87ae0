#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

//! # Voxel World
//!
//! A streaming, chunked voxel world: procedural terrain, per-voxel sky and
//! block light, greedy-merged collision volumes, per-texture mesh export and
//! a fixed-step entity simulation, with chunk builds running on a bounded
//! pool of worker threads.
//!
//! ## Key Modules
//!
//! * `core` - Shared-ownership primitives used throughout the world
//! * `engine_state` - The world, its chunk pipeline, tasks, rendering export and networking
//! * `config` - JSON-backed world configuration
//! * `error` - Error types surfaced by the public API
//!
//! ## Architecture
//!
//! The world is split into 16x256x16 chunks addressed by integer chunk
//! coordinates. Each chunk moves through a small state machine while a
//! worker generates its blocks, computes its light and exports its mesh.
//! The main thread owns the [`engine_state::EngineState`], advances entity
//! physics at a fixed rate, streams chunks around the player and hands
//! finished meshes to a [`engine_state::rendering::RenderBackend`].
//!
//! ## Usage
//!
//! ```no_run
//! use voxel_world::{config::WorldConfig, engine_state::EngineState};
//!
//! voxel_world::init_logging();
//! let mut engine = EngineState::new(WorldConfig::default()).unwrap();
//! engine.start();
//! engine.advance(0.05);
//! ```

use log::info;

pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

pub use config::WorldConfig;
pub use engine_state::voxels::block::{block_type::BlockType, BlockRegistry};
pub use engine_state::voxels::world::VoxelWorld;
pub use engine_state::EngineState;

/// Name of the stopwatch logged around world start-up.
pub const WORLD_INITIALIZATION_STOPWATCH: &str = "World Initialization";

/// Initializes the `env_logger` backend, writing to stdout and filtered by `RUST_LOG`.
///
/// Safe to call more than once; only the first call installs the logger.
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    let installed = log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init()
        .is_ok();

    if installed {
        info!("Logger initialized");
    }
}
