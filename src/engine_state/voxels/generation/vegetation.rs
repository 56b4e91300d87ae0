//! Trees and flowers, placed after the terrain of a chunk is complete.
//!
//! Placement stays two columns away from the chunk border, so a tree never
//! needs to write into a neighbor. The random source is seeded from the chunk
//! coordinate, which keeps regeneration bit-identical.

use fastrand::Rng;

use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::chunk::{BlockGrid, ChunkCoord, CHUNK_SIZE_XZ, CHUNK_SIZE_Y};
use crate::engine_state::voxels::noise::NoiseLibrary;

use super::biome::Biome;
use super::region::RegionMaps;

const BORDER: usize = 2;
const TREE_CLEARANCE: usize = 7;
const TREE_RADIUS: i32 = 2;
const TREE_NOISE_THRESHOLD: f64 = 0.7;

/// Seed of the per-chunk random source.
pub fn vegetation_seed(coord: ChunkCoord) -> u64 {
    (coord.x as i64 * 1000 + coord.z as i64) as u64
}

/// Decorates a generated chunk with trees (Forest) and flowers (Plains).
pub fn decorate(blocks: &mut BlockGrid, noise: &NoiseLibrary, coord: ChunkCoord, maps: &RegionMaps) {
    let mut rng = Rng::with_seed(vegetation_seed(coord));
    let (origin_x, origin_z) = coord.world_origin();

    for x in BORDER..CHUNK_SIZE_XZ - BORDER {
        for z in BORDER..CHUNK_SIZE_XZ - BORDER {
            let Some(surface_y) = find_surface(blocks, x, z) else {
                continue;
            };
            if surface_y == 0 || surface_y >= CHUNK_SIZE_Y - 10 {
                continue;
            }
            if blocks.get(x, surface_y, z) != BlockType::Grass {
                continue;
            }

            let wx = (origin_x + x as i32) as f64;
            let wz = (origin_z + z as i32) as f64;

            match maps.local_biome(x, z) {
                Biome::Forest => {
                    let tree_noise = noise.noise2(wx * 0.3, wz * 0.3);
                    if tree_noise > TREE_NOISE_THRESHOLD && has_space_for_tree(blocks, x, surface_y, z) {
                        place_tree(blocks, x, surface_y + 1, z, &mut rng);
                    }
                }
                Biome::Plains => {
                    let flower_noise = noise.normalized01(wx * 0.5, wz * 0.5);
                    if flower_noise > 0.8 {
                        blocks.set(x, surface_y + 1, z, BlockType::Rose);
                    } else if flower_noise < 0.2 {
                        blocks.set(x, surface_y + 1, z, BlockType::Dandelion);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Highest block in the column that is neither air nor water.
fn find_surface(blocks: &BlockGrid, x: usize, z: usize) -> Option<usize> {
    (0..CHUNK_SIZE_Y).rev().find(|&y| {
        let block_type = blocks.get(x, y, z);
        block_type != BlockType::Air && block_type != BlockType::Water
    })
}

/// Checks a 5×5×7 box above `(x, y, z)` for air.
pub fn has_space_for_tree(blocks: &BlockGrid, x: usize, y: usize, z: usize) -> bool {
    for dy in 1..=TREE_CLEARANCE {
        for dx in -TREE_RADIUS..=TREE_RADIUS {
            for dz in -TREE_RADIUS..=TREE_RADIUS {
                let nx = x as i32 + dx;
                let nz = z as i32 + dz;
                let ny = (y + dy) as i32;
                match blocks.get_checked(nx, ny, nz) {
                    Some(BlockType::Air) => {}
                    Some(_) => return false,
                    None if ny >= CHUNK_SIZE_Y as i32 => return false,
                    None => {}
                }
            }
        }
    }
    true
}

/// Grows an oak: a 4 to 6 block trunk starting at `(x, y, z)` under three
/// layers of leaves with radii 2, 3, 2.
pub fn place_tree(blocks: &mut BlockGrid, x: usize, y: usize, z: usize, rng: &mut Rng) {
    let trunk_height = 4 + rng.usize(0..3);
    for dy in 0..trunk_height {
        if y + dy < CHUNK_SIZE_Y {
            blocks.set(x, y + dy, z, BlockType::OakLog);
        }
    }

    let leaf_y = (y + trunk_height) as i32;
    for (layer, radius) in [2i32, 3, 2].into_iter().enumerate() {
        let ny = leaf_y - 1 + layer as i32;
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                if (dx.abs() + dz.abs()) as f32 > radius as f32 * 1.5 {
                    continue;
                }
                let nx = x as i32 + dx;
                let nz = z as i32 + dz;
                if blocks.get_checked(nx, ny, nz) == Some(BlockType::Air) {
                    blocks.set(nx as usize, ny as usize, nz as usize, BlockType::OakLeaves);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_has_trunk_and_canopy() {
        let mut blocks = BlockGrid::new();
        blocks.fill_layers(0, 63, BlockType::Dirt);
        let mut rng = Rng::with_seed(vegetation_seed(ChunkCoord::new(2, 3)));

        assert!(has_space_for_tree(&blocks, 8, 63, 8));
        place_tree(&mut blocks, 8, 64, 8, &mut rng);

        let trunk = (64..72).take_while(|y| blocks.get(8, *y, 8) == BlockType::OakLog).count();
        assert!((4..=6).contains(&trunk));
        assert_eq!(blocks.get(8, 64 + trunk, 8), BlockType::OakLeaves);
        assert_eq!(blocks.get(11, 64 + trunk, 8), BlockType::OakLeaves);
        assert!(!has_space_for_tree(&blocks, 9, 63, 8));
    }

    #[test]
    fn same_seed_same_tree() {
        let grow = || {
            let mut blocks = BlockGrid::new();
            let mut rng = Rng::with_seed(vegetation_seed(ChunkCoord::new(-4, 9)));
            place_tree(&mut blocks, 5, 70, 5, &mut rng);
            blocks
        };
        assert!(grow() == grow());
    }
}
