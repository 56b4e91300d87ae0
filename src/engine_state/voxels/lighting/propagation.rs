//! # Light Propagation
//!
//! Full-chunk light recompute, run in five passes:
//!
//! 1. **Column seeding** - every column is scanned top-down; sky light is 15
//!    until the first non-transparent voxel and 0 from there on.
//! 2. **Boundary import** - transparent voxels on the four chunk edges take
//!    the neighbor's light across the seam when it is brighter.
//! 3. **Horizontal holes** - fully lit voxels next to a dimmer transparent
//!    voxel push light sideways, one level per step. Every sideways step also
//!    falls straight down while that brightens the column below.
//! 4. **Source seeding** - emitting blocks set their block light.
//! 5. **Flood** - a breadth-first relaxation over all six neighbors starting
//!    from every lit voxel. A voxel is only ever raised, so the result does
//!    not depend on visit order.
//!
//! Neighbors are read from a [`NeighborEdges`] snapshot and never modified.

use std::collections::VecDeque;

use log::trace;

use crate::engine_state::voxels::block::BlockRegistry;
use crate::engine_state::voxels::chunk::chunk_iteration::ChunkBlockIterator;
use crate::engine_state::voxels::chunk::neighbors::NeighborEdges;
use crate::engine_state::voxels::chunk::{
    in_bounds, BlockGrid, CHUNK_DIMENSION, CHUNK_SIZE_XZ, CHUNK_SIZE_Y,
};

use super::{LightChannel, LightMap, MAX_LIGHT_LEVEL};

const HORIZONTAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const ALL_DIRECTIONS: [(i32, i32, i32); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

#[derive(Copy, Clone, Debug)]
struct LightNode {
    x: i32,
    y: i32,
    z: i32,
    level: u8,
    channel: LightChannel,
}

struct LightEngine<'a> {
    blocks: &'a BlockGrid,
    registry: &'a BlockRegistry,
    neighbors: &'a NeighborEdges,
    light: LightMap,
}

/// Computes sky and block light for one chunk.
///
/// # Arguments
/// * `blocks` - The chunk's blocks
/// * `registry` - Transparency and emission of each block type
/// * `neighbors` - Edge light of resident neighbors, imported across seams
///
/// # Returns
/// A light map with every value in `0..=15`.
pub fn compute_light(
    blocks: &BlockGrid,
    registry: &BlockRegistry,
    neighbors: &NeighborEdges,
) -> LightMap {
    let mut engine = LightEngine {
        blocks,
        registry,
        neighbors,
        light: LightMap::new(),
    };

    engine.seed_columns();
    engine.import_boundaries();
    engine.propagate_sunlight_horizontally();
    engine.seed_sources();
    engine.flood();

    engine.light
}

impl<'a> LightEngine<'a> {
    #[inline]
    fn is_transparent(&self, x: i32, y: i32, z: i32) -> bool {
        in_bounds(x, y, z)
            && self
                .registry
                .is_transparent(self.blocks.get(x as usize, y as usize, z as usize))
    }

    #[inline]
    fn level(&self, channel: LightChannel, x: i32, y: i32, z: i32) -> u8 {
        self.light.get(channel, x as usize, y as usize, z as usize)
    }

    #[inline]
    fn set_level(&mut self, channel: LightChannel, x: i32, y: i32, z: i32, level: u8) {
        self.light.set(channel, x as usize, y as usize, z as usize, level);
    }

    fn seed_columns(&mut self) {
        for x in 0..CHUNK_SIZE_XZ {
            for z in 0..CHUNK_SIZE_XZ {
                for y in (0..CHUNK_SIZE_Y).rev() {
                    if !self.registry.is_transparent(self.blocks.get(x, y, z)) {
                        break;
                    }
                    self.light.set(LightChannel::Sky, x, y, z, MAX_LIGHT_LEVEL);
                }
            }
        }
    }

    fn import_boundaries(&mut self) {
        let last = CHUNK_DIMENSION - 1;
        for y in 0..CHUNK_SIZE_Y as i32 {
            for i in 0..CHUNK_DIMENSION {
                // (local edge voxel, voxel across the seam)
                let seams = [
                    ((last, i), (CHUNK_DIMENSION, i)),
                    ((0, i), (-1, i)),
                    ((i, last), (i, CHUNK_DIMENSION)),
                    ((i, 0), (i, -1)),
                ];
                for ((x, z), (nx, nz)) in seams {
                    if !self.is_transparent(x, y, z) {
                        continue;
                    }
                    for channel in [LightChannel::Sky, LightChannel::Block] {
                        let imported = self.neighbors.light(channel, nx, y, nz);
                        if imported > self.level(channel, x, y, z) {
                            self.set_level(channel, x, y, z, imported);
                        }
                    }
                }
            }
        }
    }

    fn has_horizontal_hole(&self, x: i32, y: i32, z: i32) -> bool {
        HORIZONTAL.iter().any(|(dx, dz)| {
            let (nx, nz) = (x + dx, z + dz);
            self.is_transparent(nx, y, nz)
                && self.level(LightChannel::Sky, nx, y, nz) < MAX_LIGHT_LEVEL
        })
    }

    fn propagate_sunlight_horizontally(&mut self) {
        let mut queue: VecDeque<(i32, i32, i32)> = VecDeque::new();

        for x in 0..CHUNK_DIMENSION {
            for z in 0..CHUNK_DIMENSION {
                for y in (0..CHUNK_SIZE_Y as i32).rev() {
                    if self.level(LightChannel::Sky, x, y, z) != MAX_LIGHT_LEVEL {
                        break;
                    }
                    if self.is_transparent(x, y, z) && self.has_horizontal_hole(x, y, z) {
                        queue.push_back((x, y, z));
                    }
                }
            }
        }

        trace!("Horizontal sunlight pass seeded with {} holes", queue.len());

        while let Some((x, y, z)) = queue.pop_front() {
            let level = self.level(LightChannel::Sky, x, y, z);
            if level <= 1 {
                continue;
            }
            for (dx, dz) in HORIZONTAL {
                self.try_sun_horizontal(x + dx, y, z + dz, level - 1, &mut queue);
            }
        }
    }

    fn try_sun_horizontal(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        level: u8,
        queue: &mut VecDeque<(i32, i32, i32)>,
    ) {
        if !self.is_transparent(x, y, z) || self.level(LightChannel::Sky, x, y, z) >= level {
            return;
        }
        self.set_level(LightChannel::Sky, x, y, z, level);

        let mut below = y - 1;
        while self.is_transparent(x, below, z) && self.level(LightChannel::Sky, x, below, z) < level {
            self.set_level(LightChannel::Sky, x, below, z, level);
            below -= 1;
        }

        queue.push_back((x, y, z));
    }

    fn seed_sources(&mut self) {
        for (position, block_type) in ChunkBlockIterator::new(self.blocks) {
            let emission = self.registry.light_emission(block_type);
            if emission > 0 {
                self.light
                    .set(LightChannel::Block, position.x, position.y, position.z, emission);
            }
        }
    }

    fn flood(&mut self) {
        let mut queue: VecDeque<LightNode> = VecDeque::new();
        for y in 0..CHUNK_SIZE_Y as i32 {
            for z in 0..CHUNK_DIMENSION {
                for x in 0..CHUNK_DIMENSION {
                    for channel in [LightChannel::Sky, LightChannel::Block] {
                        let level = self.level(channel, x, y, z);
                        if level > 0 {
                            queue.push_back(LightNode { x, y, z, level, channel });
                        }
                    }
                }
            }
        }

        while let Some(node) = queue.pop_front() {
            if node.level <= 1 {
                continue;
            }
            let next = node.level - 1;
            for (dx, dy, dz) in ALL_DIRECTIONS {
                let (x, y, z) = (node.x + dx, node.y + dy, node.z + dz);
                if !self.is_transparent(x, y, z) {
                    continue;
                }
                if self.level(node.channel, x, y, z) < next {
                    self.set_level(node.channel, x, y, z, next);
                    queue.push_back(LightNode {
                        x,
                        y,
                        z,
                        level: next,
                        channel: node.channel,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    fn ground(height: usize) -> BlockGrid {
        let mut blocks = BlockGrid::new();
        blocks.fill_layers(0, height - 1, BlockType::Stone);
        blocks
    }

    #[test]
    fn open_sky_is_full_and_ground_is_dark() {
        let registry = BlockRegistry::default();
        let light = compute_light(&ground(64), &registry, &NeighborEdges::none());
        assert_eq!(light.sky(4, 64, 4), MAX_LIGHT_LEVEL);
        assert_eq!(light.sky(4, 255, 4), MAX_LIGHT_LEVEL);
        assert_eq!(light.sky(4, 63, 4), 0);
        assert_eq!(light.sky(4, 10, 4), 0);
    }

    #[test]
    fn light_leaks_under_an_overhang() {
        let registry = BlockRegistry::default();
        let mut blocks = ground(64);
        // roof over x in 0..8 at y=70, open sky for x >= 8
        for x in 0..8 {
            for z in 0..16 {
                blocks.set(x, 70, z, BlockType::Stone);
            }
        }
        let light = compute_light(&blocks, &registry, &NeighborEdges::none());

        assert_eq!(light.sky(8, 65, 8), 15);
        assert_eq!(light.sky(7, 65, 8), 14);
        assert_eq!(light.sky(5, 65, 8), 12);
        assert_eq!(light.sky(0, 65, 8), 7);
    }

    #[test]
    fn emitter_falls_off_by_one_per_step() {
        let registry = BlockRegistry::builder()
            .with_light_emission(BlockType::OakPlanks, 15)
            .build();
        let mut blocks = ground(10);
        // cover the area so sky light stays out of the measurement
        blocks.fill_layers(40, 40, BlockType::Stone);
        blocks.set(2, 20, 8, BlockType::OakPlanks);

        let light = compute_light(&blocks, &registry, &NeighborEdges::none());
        assert_eq!(light.block(2, 20, 8), 15);

        let mut previous = 15;
        for step in 1..=13usize {
            let level = light.block(2 + step, 20, 8);
            assert!(level >= 15 - step as u8);
            assert!(level <= previous);
            previous = level;
        }
    }

    #[test]
    fn enclosed_emitter_stays_enclosed() {
        let registry = BlockRegistry::builder()
            .with_light_emission(BlockType::OakPlanks, 15)
            .build();
        let mut blocks = BlockGrid::new();
        for x in 7..=9 {
            for y in 99..=101 {
                for z in 7..=9 {
                    blocks.set(x, y, z, BlockType::Stone);
                }
            }
        }
        blocks.set(8, 100, 8, BlockType::OakPlanks);

        let light = compute_light(&blocks, &registry, &NeighborEdges::none());
        assert_eq!(light.block(8, 100, 8), 15);
        for (index, level) in light.as_slice(LightChannel::Block).iter().enumerate() {
            let x = index % 16;
            let z = (index / 16) % 16;
            let y = index / 256;
            let inside = (7..=9).contains(&x) && (99..=101).contains(&y) && (7..=9).contains(&z);
            if !inside {
                assert_eq!(*level, 0, "light leaked to ({x}, {y}, {z})");
            }
        }
    }

    #[test]
    fn values_stay_in_range() {
        let registry = BlockRegistry::builder()
            .with_light_emission(BlockType::Dirt, 15)
            .build();
        let mut blocks = ground(30);
        blocks.set(3, 31, 3, BlockType::Dirt);
        let light = compute_light(&blocks, &registry, &NeighborEdges::none());
        for channel in [LightChannel::Sky, LightChannel::Block] {
            assert!(light.as_slice(channel).iter().all(|level| *level <= MAX_LIGHT_LEVEL));
        }
    }
}
