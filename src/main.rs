//! # Headless World Driver
//!
//! Runs a singleplayer world without a window: streams in the area around
//! the spawn point, then walks the player along +X for a number of fixed
//! steps while chunks stream in and out, and logs what happened.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info VOXEL_WORLD_CONFIG=world.json cargo run --release -- 400
//! ```
//!
//! The optional argument is the number of fixed steps to run (default 200).

use std::env;
use std::process::ExitCode;

use cgmath::Vector3;
use log::{error, info};
use web_time::{Duration, Instant};

use voxel_world::config::{WorldConfig, CONFIG_PATH_ENV};
use voxel_world::engine_state::rendering::RecordingBackend;
use voxel_world::engine_state::voxels::physics::CollisionKind;
use voxel_world::engine_state::EngineState;
use voxel_world::WORLD_INITIALIZATION_STOPWATCH;

const DEFAULT_TICKS: u64 = 200;

fn load_config() -> Result<WorldConfig, voxel_world::error::ConfigError> {
    match env::var(CONFIG_PATH_ENV) {
        Ok(path) => WorldConfig::load(path),
        Err(_) => Ok(WorldConfig::default()),
    }
}

fn main() -> ExitCode {
    voxel_world::init_logging();

    let ticks = env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TICKS);

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let step = config.fixed_time_step();

    let mut engine = match EngineState::new(config) {
        Ok(engine) => engine,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let mut backend = RecordingBackend::default();

    let started = Instant::now();
    if let Err(err) = engine.start() {
        error!("{err}");
        return ExitCode::FAILURE;
    }
    engine.run_until_idle(Duration::from_secs(120));
    engine.drain_render_uploads(&mut backend);
    info!(
        "{WORLD_INITIALIZATION_STOPWATCH}: {} chunks in {:?}",
        engine.world().chunk_count(),
        started.elapsed()
    );

    let mut grounded_steps = 0u64;
    for tick in 0..ticks {
        if let Some(player) = engine.world_mut().player_mut() {
            player.move_input(Vector3::new(0.0, 0.0, 1.0), 0.0);
        }
        engine.fixed_update(step);
        engine.process_tasks();
        engine.drain_render_uploads(&mut backend);

        if engine.last_report().count(CollisionKind::Ground) > 0 {
            grounded_steps += 1;
        }
        if tick % 20 == 0 {
            if let Some(player) = engine.world().player() {
                info!(
                    "Tick {tick}: player at ({:.1}, {:.1}, {:.1}), {} chunks resident, {} jobs queued",
                    player.position.x,
                    player.position.y,
                    player.position.z,
                    engine.world().chunk_count(),
                    engine.task_manager().queued_len()
                );
            }
        }
    }

    info!(
        "Ran {} steps: {} uploads, {} releases, {} meshes resident, grounded for {grounded_steps} steps",
        engine.ticks(),
        backend.uploads,
        backend.releases,
        backend.resident.len()
    );
    ExitCode::SUCCESS
}
