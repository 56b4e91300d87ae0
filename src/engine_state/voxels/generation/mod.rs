//! # Terrain Generation
//!
//! Turns a chunk coordinate into a [`BlockGrid`]. Generation is a pure
//! function of the world seed and the coordinate: noise is sampled in world
//! space and vegetation uses a random source seeded from the coordinate, so
//! regenerating a chunk always yields the same blocks.
//!
//! ## Pipeline
//!
//! 1. [`region::RegionMaps`] samples height, moisture and temperature over a
//!    48×48 window around the chunk, blurs height and moisture and classifies
//!    every column into a [`biome::Biome`].
//! 2. Each column gets a surface height from the blurred height field and the
//!    blended biome constants.
//! 3. [`layers::fill_column`] fills bedrock, stone, ores, dirt, the surface
//!    block, sea water and caves.
//! 4. [`vegetation::decorate`] adds trees and flowers.
//!
//! [`GenerationMode::Flat`] skips all of this and produces the same flat
//! column everywhere.

pub mod biome;
pub mod layers;
pub mod region;
pub mod vegetation;

use crate::config::{GenerationMode, WorldConfig};
use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::chunk::{BlockGrid, ChunkCoord, CHUNK_SIZE_XZ};
use crate::engine_state::voxels::noise::NoiseLibrary;

use layers::Column;
use region::RegionMaps;

/// Water fills air below this height in columns whose surface is lower.
pub const SEA_LEVEL: i32 = 62;

/// Height of the grass layer in flat worlds.
pub const FLAT_SURFACE: usize = 63;

/// Anything that can produce the blocks of a chunk.
///
/// Implementations are shared between worker threads and must be
/// deterministic for a given coordinate.
pub trait ChunkGenerator: Send + Sync {
    /// Produces the blocks of the chunk at `coord`.
    fn generate(&self, coord: ChunkCoord) -> BlockGrid;
}

/// The procedural terrain generator.
#[derive(Clone, Debug)]
pub struct TerrainGenerator {
    noise: NoiseLibrary,
    mode: GenerationMode,
}

impl TerrainGenerator {
    /// A generator for one world seed.
    pub fn new(seed: u32, mode: GenerationMode) -> Self {
        Self {
            noise: NoiseLibrary::new(seed),
            mode,
        }
    }

    /// A generator for the seed and mode of `config`.
    pub fn from_config(config: &WorldConfig) -> Self {
        Self::new(config.seed, config.generation)
    }

    /// Which terrain this generator produces.
    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    /// The seeded noise fields shared by every chunk.
    pub fn noise(&self) -> &NoiseLibrary {
        &self.noise
    }

    fn generate_noise(&self, coord: ChunkCoord) -> BlockGrid {
        let maps = RegionMaps::build(&self.noise, coord);
        let (origin_x, origin_z) = coord.world_origin();
        let mut blocks = BlockGrid::new();

        for x in 0..CHUNK_SIZE_XZ {
            for z in 0..CHUNK_SIZE_XZ {
                let column = Column {
                    x,
                    z,
                    world_x: origin_x + x as i32,
                    world_z: origin_z + z as i32,
                };
                let surface = maps.surface_height(x, z);
                layers::fill_column(&mut blocks, &self.noise, column, surface, maps.local_biome(x, z));
            }
        }

        vegetation::decorate(&mut blocks, &self.noise, coord, &maps);
        blocks
    }
}

impl ChunkGenerator for TerrainGenerator {
    fn generate(&self, coord: ChunkCoord) -> BlockGrid {
        match self.mode {
            GenerationMode::Noise => self.generate_noise(coord),
            GenerationMode::Flat => flat_blocks(),
        }
    }
}

/// The flat column: bedrock at y = 0, stone up to y = 62, grass at y = 63.
pub fn flat_blocks() -> BlockGrid {
    let mut blocks = BlockGrid::new();
    blocks.fill_layers(0, 0, BlockType::Bedrock);
    blocks.fill_layers(1, FLAT_SURFACE - 1, BlockType::Stone);
    blocks.fill_layers(FLAT_SURFACE, FLAT_SURFACE, BlockType::Grass);
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::CHUNK_SIZE_Y;

    #[test]
    fn flat_mode_layers() {
        let generator = TerrainGenerator::new(1234, GenerationMode::Flat);
        let blocks = generator.generate(ChunkCoord::new(-7, 3));
        for x in 0..CHUNK_SIZE_XZ {
            for z in 0..CHUNK_SIZE_XZ {
                assert_eq!(blocks.get(x, 0, z), BlockType::Bedrock);
                for y in 1..FLAT_SURFACE {
                    assert_eq!(blocks.get(x, y, z), BlockType::Stone);
                }
                assert_eq!(blocks.get(x, FLAT_SURFACE, z), BlockType::Grass);
                for y in FLAT_SURFACE + 1..CHUNK_SIZE_Y {
                    assert_eq!(blocks.get(x, y, z), BlockType::Air);
                }
            }
        }
    }

    #[test]
    fn noise_generation_is_deterministic() {
        let a = TerrainGenerator::new(2024, GenerationMode::Noise);
        let b = TerrainGenerator::new(2024, GenerationMode::Noise);
        for coord in [ChunkCoord::new(0, 0), ChunkCoord::new(-3, 5)] {
            assert!(a.generate(coord) == b.generate(coord));
        }
    }

    #[test]
    fn every_noise_column_has_bedrock() {
        let generator = TerrainGenerator::new(77, GenerationMode::Noise);
        let blocks = generator.generate(ChunkCoord::new(4, -2));
        for x in 0..CHUNK_SIZE_XZ {
            for z in 0..CHUNK_SIZE_XZ {
                assert_eq!(blocks.get(x, 0, z), BlockType::Bedrock);
            }
        }
    }
}
