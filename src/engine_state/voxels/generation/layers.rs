//! # Geological Layers
//!
//! Fills one column bottom to top:
//!
//! | Band | Content |
//! |------|---------|
//! | `y = 0` | bedrock |
//! | `1..5` | bedrock or stone, by noise |
//! | `5..surface-20` | stone with iron and coal, thinning out with depth |
//! | `surface-20..surface-6` | stone fading into dirt |
//! | `surface-6..surface-1` | dirt |
//! | `surface-1` | biome surface block |
//! | `surface..62` | water, for columns below sea level |
//!
//! Caves are carved afterwards between `y = 11` and ten blocks below the
//! surface.

use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::chunk::{BlockGrid, CHUNK_SIZE_Y};
use crate::engine_state::voxels::noise::NoiseLibrary;

use super::biome::Biome;
use super::SEA_LEVEL;

const DEEP_STONE_DEPTH: i32 = 20;
const TRANSITION_BAND: f64 = 14.0;
const ORE_CEILING: i32 = 32;

/// World position of the column being filled.
#[derive(Copy, Clone, Debug)]
pub struct Column {
    /// Chunk-local X
    pub x: usize,
    /// Chunk-local Z
    pub z: usize,
    /// World X
    pub world_x: i32,
    /// World Z
    pub world_z: i32,
}

impl Column {
    #[inline]
    fn sample3(&self, noise: &NoiseLibrary, y: i32, scale: f64) -> f64 {
        noise.noise3(
            self.world_x as f64 * scale,
            y as f64 * scale,
            self.world_z as f64 * scale,
        )
    }
}

/// Writes every block of one column.
///
/// # Arguments
/// * `blocks` - Grid being generated
/// * `noise` - Shared noise source
/// * `column` - Which column to fill
/// * `surface` - Column height; the surface block sits at `surface - 1`
/// * `biome` - Biome at the column, chooses the surface block
pub fn fill_column(
    blocks: &mut BlockGrid,
    noise: &NoiseLibrary,
    column: Column,
    surface: i32,
    biome: Biome,
) {
    for y in 0..CHUNK_SIZE_Y as i32 {
        let mut block_type = layer_block(noise, column, y, surface, biome);

        if y > 10
            && y < surface - 10
            && block_type != BlockType::Air
            && block_type != BlockType::Water
            && is_cave(noise, column, y, surface)
        {
            block_type = BlockType::Air;
        }

        if block_type != BlockType::Air {
            blocks.set(column.x, y as usize, column.z, block_type);
        }
    }
}

fn layer_block(noise: &NoiseLibrary, column: Column, y: i32, surface: i32, biome: Biome) -> BlockType {
    if y == 0 {
        return BlockType::Bedrock;
    }
    if y < 5 {
        return if column.sample3(noise, y, 0.5) > 0.3 {
            BlockType::Bedrock
        } else {
            BlockType::Stone
        };
    }
    if y < surface - DEEP_STONE_DEPTH {
        return ore_or_stone(noise, column, y);
    }
    if y < surface - 6 {
        let transition = (y - (surface - DEEP_STONE_DEPTH)) as f64 / TRANSITION_BAND;
        return if column.sample3(noise, y, 0.6) > transition * 1.2 {
            BlockType::Dirt
        } else {
            BlockType::Stone
        };
    }
    if y < surface - 1 {
        return BlockType::Dirt;
    }
    if y == surface - 1 {
        return surface_block(noise, column, surface, biome);
    }
    if y < SEA_LEVEL {
        return BlockType::Water;
    }
    BlockType::Air
}

/// Scale of the ore noise thresholds: 0 at the ore ceiling, rising to 1 at
/// y = 0. A higher threshold means fewer ores, so ores thin out with depth.
fn ore_threshold_scale(y: i32) -> f64 {
    (ORE_CEILING - y).max(0) as f64 / ORE_CEILING as f64
}

/// Ores only appear below y = 32; see [`ore_threshold_scale`].
fn ore_or_stone(noise: &NoiseLibrary, column: Column, y: i32) -> BlockType {
    if y >= ORE_CEILING {
        return BlockType::Stone;
    }
    let density = ore_threshold_scale(y);

    if y > 16 && y < 64 && column.sample3(noise, y, 0.8) > 0.8 * density {
        BlockType::IronOre
    } else if y < 128 && column.sample3(noise, y, 0.7) > 0.75 * density {
        BlockType::CoalOre
    } else {
        BlockType::Stone
    }
}

fn surface_block(noise: &NoiseLibrary, column: Column, height: i32, biome: Biome) -> BlockType {
    let sample = noise.noise2(column.world_x as f64 * 0.1, column.world_z as f64 * 0.1);

    match biome {
        Biome::SnowyMountains => {
            if height > 90 || (height > 80 && sample > 0.6) {
                BlockType::SnowGrass
            } else {
                BlockType::Stone
            }
        }
        Biome::Mountains => {
            if height > 100 || (height > 85 && sample > 0.7) {
                BlockType::Stone
            } else {
                BlockType::Grass
            }
        }
        Biome::Hills if sample > 0.8 && height > 75 => BlockType::Stone,
        Biome::Forest if sample > 0.9 => BlockType::Podzol,
        Biome::Swamp if sample > 0.7 && height < 64 => BlockType::Water,
        Biome::Beach => BlockType::Sand,
        Biome::Ocean => BlockType::Gravel,
        Biome::River if height < 60 => BlockType::Gravel,
        _ => BlockType::Grass,
    }
}

/// Two 3D noise fields must both be high for a cave. The first field's
/// threshold drops with depth, so caves widen further down.
fn is_cave(noise: &NoiseLibrary, column: Column, y: i32, surface: i32) -> bool {
    let span = (surface - 20) as f64;
    if span <= 0.0 {
        return false;
    }
    let (wx, wy, wz) = (column.world_x as f64, y as f64, column.world_z as f64);

    let cave1 = noise.octave3(wx, wy, wz, 2, 0.5, 0.03);
    let cave2 = noise.octave3(wx * 1.5, wy * 1.5, wz * 1.5, 1, 0.8, 0.05);

    let depth_factor = (1.0 - (y - 10) as f64 / span).clamp(0.1, 1.0);
    let threshold = 0.65 - depth_factor * 0.3;

    cave1 > threshold && cave2 > 0.4
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column() -> Column {
        Column {
            x: 3,
            z: 4,
            world_x: 35,
            world_z: -12,
        }
    }

    #[test]
    fn column_has_floor_dirt_and_surface() {
        let noise = NoiseLibrary::new(11);
        let mut blocks = BlockGrid::new();
        fill_column(&mut blocks, &noise, column(), 80, Biome::Beach);

        assert_eq!(blocks.get(3, 0, 4), BlockType::Bedrock);
        assert_eq!(blocks.get(3, 79, 4), BlockType::Sand);
        for y in 74..79 {
            assert_eq!(blocks.get(3, y, 4), BlockType::Dirt);
        }
        for y in 80..256 {
            assert_eq!(blocks.get(3, y, 4), BlockType::Air);
        }
    }

    #[test]
    fn low_columns_flood_to_sea_level() {
        let noise = NoiseLibrary::new(11);
        let mut blocks = BlockGrid::new();
        fill_column(&mut blocks, &noise, column(), 50, Biome::Ocean);

        assert_eq!(blocks.get(3, 49, 4), BlockType::Gravel);
        for y in 50..SEA_LEVEL as usize {
            assert_eq!(blocks.get(3, y, 4), BlockType::Water);
        }
        assert_eq!(blocks.get(3, SEA_LEVEL as usize, 4), BlockType::Air);
    }

    #[test]
    fn ore_thresholds_rise_with_depth() {
        assert_eq!(ore_threshold_scale(ORE_CEILING), 0.0);
        assert_eq!(ore_threshold_scale(0), 1.0);
        assert!(ore_threshold_scale(5) > ore_threshold_scale(20));
    }

    #[test]
    fn snow_needs_altitude() {
        let noise = NoiseLibrary::new(5);
        assert_eq!(surface_block(&noise, column(), 95, Biome::SnowyMountains), BlockType::SnowGrass);
        assert_eq!(surface_block(&noise, column(), 70, Biome::SnowyMountains), BlockType::Stone);
        assert_eq!(surface_block(&noise, column(), 120, Biome::Mountains), BlockType::Stone);
    }
}
