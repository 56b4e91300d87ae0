use std::sync::Arc;

use web_time::Duration;

use voxel_world::config::{GenerationMode, WorldConfig};
use voxel_world::engine_state::voxels::block::block_type::BlockType;
use voxel_world::engine_state::voxels::chunk::{BlockGrid, ChunkCoord, ChunkState};
use voxel_world::engine_state::voxels::generation::{ChunkGenerator, TerrainGenerator};
use voxel_world::engine_state::EngineState;
use voxel_world::error::WorldError;
use voxel_world::VoxelWorld;

const BROKEN: ChunkCoord = ChunkCoord::new(0, 0);

/// Flat terrain that panics for one chunk.
struct BrokenColumn {
    inner: TerrainGenerator,
}

impl ChunkGenerator for BrokenColumn {
    fn generate(&self, coord: ChunkCoord) -> BlockGrid {
        if coord == BROKEN {
            panic!("corrupt column data");
        }
        self.inner.generate(coord)
    }
}

fn config(worker_count: usize) -> WorldConfig {
    WorldConfig {
        streaming_radius: 1,
        worker_count,
        generation: GenerationMode::Flat,
        ..WorldConfig::default()
    }
}

fn broken_engine(worker_count: usize) -> EngineState {
    let config = config(worker_count);
    let generator = Arc::new(BrokenColumn {
        inner: TerrainGenerator::from_config(&config),
    });
    let world = VoxelWorld::with_generator(&config, generator);
    EngineState::with_world(config, world).unwrap()
}

#[test]
fn panicking_generation_marks_only_its_chunk() {
    let mut engine = broken_engine(1);
    engine.start().unwrap();
    assert!(engine.run_until_idle(Duration::from_secs(60)));

    let world = engine.world();
    match world.chunk_state(BROKEN) {
        Some(ChunkState::Errored(reason)) => assert!(reason.contains("corrupt column data"), "{reason}"),
        other => panic!("expected an errored chunk, got {other:?}"),
    }
    for coord in world.chunks().coords() {
        if coord != BROKEN {
            assert_eq!(world.chunk_state(coord), Some(ChunkState::Ready), "chunk {coord}");
        }
    }
    assert_eq!(engine.task_manager().worker_count(), 1);
}

#[test]
fn errored_chunk_rejects_edits_and_is_not_retried() {
    let mut engine = broken_engine(2);
    engine.start().unwrap();
    assert!(engine.run_until_idle(Duration::from_secs(60)));

    let err = engine.world_mut().set_block_at(3, 70, 3, BlockType::Stone).unwrap_err();
    assert!(matches!(err, WorldError::ChunkErrored { x: 0, z: 0, .. }));
    assert_eq!(engine.world().block_type_at(3, 70, 3), BlockType::Air);

    let update = engine.world_mut().update_streaming(BROKEN);
    assert!(update.is_empty());
    assert!(engine.world_mut().take_tasks().is_empty());
    assert!(matches!(engine.world().chunk_state(BROKEN), Some(ChunkState::Errored(_))));
}

#[test]
fn neighbors_of_an_errored_chunk_still_accept_edits() {
    let mut engine = broken_engine(2);
    engine.start().unwrap();
    assert!(engine.run_until_idle(Duration::from_secs(60)));

    // x = 16 sits on the seam with the errored chunk
    assert!(engine.world_mut().set_block_at(16, 64, 4, BlockType::Sand).unwrap());
    assert_eq!(engine.world().block_type_at(16, 64, 4), BlockType::Sand);
    assert_eq!(
        engine.world().chunk_state(ChunkCoord::new(1, 0)),
        Some(ChunkState::Ready)
    );
}

#[test]
fn every_chunk_builds_with_many_workers() {
    let config = WorldConfig {
        streaming_radius: 3,
        ..config(4)
    };
    let mut engine = EngineState::new(config).unwrap();
    let update = engine.start().unwrap();
    assert_eq!(update.created.len(), 49);
    assert!(engine.run_until_idle(Duration::from_secs(120)));
    assert!(engine.task_manager().is_idle());

    for coord in engine.world().chunks().coords() {
        let chunk = engine.world().chunk(coord).unwrap();
        let chunk = chunk.get();
        assert_eq!(*chunk.state(), ChunkState::Ready);
        assert!(chunk.is_light_computed());
        assert!(chunk.mesh().vertex_count() > 0);
    }
}
