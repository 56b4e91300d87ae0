use cgmath::{Point3, Vector3};

use voxel_world::config::{GenerationMode, WorldConfig};
use voxel_world::engine_state::voxels::block::block_type::BlockType;
use voxel_world::engine_state::voxels::block::BlockRegistry;
use voxel_world::engine_state::voxels::chunk::collision::build_collision_boxes;
use voxel_world::engine_state::voxels::chunk::{
    block_index, world_to_chunk_local, BlockGrid, ChunkCoord, ChunkState,
};
use voxel_world::engine_state::voxels::lighting::{LightChannel, MAX_LIGHT_LEVEL};
use voxel_world::VoxelWorld;

fn world(generation: GenerationMode, radius: i32, seed: u32) -> VoxelWorld {
    let config = WorldConfig {
        seed,
        streaming_radius: radius,
        generation,
        ..WorldConfig::default()
    };
    VoxelWorld::new(&config)
}

fn built(mut world: VoxelWorld, center: ChunkCoord) -> VoxelWorld {
    world.update_streaming(center);
    world.build_pending_now();
    world
}

#[test]
fn set_then_get_round_trips_across_chunks() {
    let mut world = built(world(GenerationMode::Flat, 1, 0), ChunkCoord::new(0, 0));

    for (x, y, z) in [(-1, 70, -1), (0, 5, 15), (-16, 0, 31), (31, 255, -16), (7, 63, 7)] {
        assert!(world.set_block_at(x, y, z, BlockType::OakPlanks).unwrap());
        assert_eq!(world.get_block_at(x, y, z).block_type, BlockType::OakPlanks);
    }
}

#[test]
fn negative_coordinates_floor() {
    assert_eq!(world_to_chunk_local(-1), (-1, 15));

    let mut world = built(world(GenerationMode::Flat, 1, 0), ChunkCoord::new(0, 0));
    world.set_block_at(-1, 80, 0, BlockType::Sand).unwrap();
    let chunk = world.chunk(ChunkCoord::new(-1, 0)).unwrap();
    assert_eq!(chunk.get().block_at(15, 80, 0), BlockType::Sand);
}

#[test]
fn unloaded_and_out_of_range_reads_are_air() {
    let world = built(world(GenerationMode::Flat, 0, 0), ChunkCoord::new(0, 0));
    assert_eq!(world.get_block_at(3, 10, 3).block_type, BlockType::Stone);
    assert_eq!(world.get_block_at(500, 10, 3).block_type, BlockType::Air);
    assert_eq!(world.get_block_at(3, 256, 3).block_type, BlockType::Air);
    assert_eq!(world.get_block_at(3, -5, 3).block_type, BlockType::Air);
}

#[test]
fn flat_mode_column() {
    let world = built(world(GenerationMode::Flat, 0, 42), ChunkCoord::new(0, 0));
    for y in 0..256 {
        let expected = match y {
            0 => BlockType::Bedrock,
            1..=62 => BlockType::Stone,
            63 => BlockType::Grass,
            _ => BlockType::Air,
        };
        assert_eq!(world.get_block_at(5, y, 9).block_type, expected, "y = {y}");
    }
}

#[test]
fn enclosed_emitter_stays_inside_its_box() {
    let registry = BlockRegistry::builder()
        .with_light_emission(BlockType::OakPlanks, 15)
        .build();
    let mut world = built(world(GenerationMode::Flat, 0, 0).with_registry(registry), ChunkCoord::new(0, 0));

    for dx in -1..=1 {
        for dy in -1..=1 {
            for dz in -1..=1 {
                let block_type = if (dx, dy, dz) == (0, 0, 0) {
                    BlockType::OakPlanks
                } else {
                    BlockType::Stone
                };
                world.set_block_at(8 + dx, 100 + dy, 8 + dz, block_type).unwrap();
            }
        }
    }

    let chunk = world.chunk(ChunkCoord::new(0, 0)).unwrap();
    let chunk = chunk.get();
    assert_eq!(chunk.light().block(8, 100, 8), MAX_LIGHT_LEVEL);
    for (index, level) in chunk.light().as_slice(LightChannel::Block).iter().enumerate() {
        if index != block_index(8, 100, 8) {
            assert_eq!(*level, 0, "block light leaked to index {index}");
        }
    }
}

#[test]
fn emitter_light_falls_off_by_one_per_block() {
    let registry = BlockRegistry::builder()
        .with_light_emission(BlockType::OakPlanks, 15)
        .build();
    let mut world = built(world(GenerationMode::Flat, 0, 0).with_registry(registry), ChunkCoord::new(0, 0));
    world.set_block_at(8, 80, 8, BlockType::OakPlanks).unwrap();

    let chunk = world.chunk(ChunkCoord::new(0, 0)).unwrap();
    let chunk = chunk.get();
    let mut previous = MAX_LIGHT_LEVEL;
    for distance in 0..=7usize {
        let level = chunk.light().block(8 + distance, 80, 8);
        assert_eq!(level, MAX_LIGHT_LEVEL - distance as u8);
        assert!(level <= previous);
        previous = level;
    }
}

#[test]
fn generated_light_stays_in_range() {
    let world = built(world(GenerationMode::Noise, 1, 99), ChunkCoord::new(0, 0));
    for (_, chunk) in world.chunks().snapshot() {
        let chunk = chunk.get();
        assert_eq!(*chunk.state(), ChunkState::Ready);
        for channel in [LightChannel::Sky, LightChannel::Block] {
            assert!(chunk.light().as_slice(channel).iter().all(|level| *level <= MAX_LIGHT_LEVEL));
        }
    }
}

#[test]
fn generation_is_deterministic_per_seed() {
    let a = built(world(GenerationMode::Noise, 0, 1234), ChunkCoord::new(-3, 7));
    let b = built(world(GenerationMode::Noise, 0, 1234), ChunkCoord::new(-3, 7));
    let coord = ChunkCoord::new(-3, 7);
    let a = a.chunk(coord).unwrap();
    let b = b.chunk(coord).unwrap();
    assert!(a.get().blocks() == b.get().blocks());
}

#[test]
fn solid_region_collapses_to_one_box() {
    let mut blocks = BlockGrid::new();
    blocks.fill_layers(0, 15, BlockType::Stone);
    let boxes = build_collision_boxes(&blocks, &BlockRegistry::default());
    assert_eq!(boxes.len(), 1);
    assert_eq!(boxes[0].max, Point3::new(16.0, 16.0, 16.0));
}

#[test]
fn falling_body_lands_on_flat_ground() {
    let mut world = built(world(GenerationMode::Flat, 1, 0), ChunkCoord::new(0, 0));
    let id = world.spawn_prop(Point3::new(8.5, 70.0, 8.5), Vector3::new(0.5, 0.5, 0.5));

    for _ in 0..100 {
        world.tick(0.05);
    }

    let body = world.entity(id).unwrap();
    assert!(body.on_ground);
    assert!(body.position.y > 64.45 && body.position.y < 64.6, "y = {}", body.position.y);
}
