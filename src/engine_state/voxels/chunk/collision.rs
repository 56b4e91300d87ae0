//! # Collision Builder
//!
//! Covers every solid voxel of a chunk with as few axis-aligned boxes as the
//! greedy merge finds. Voxels are visited in z, y, x order; each unvisited
//! solid voxel grows a box along X, then row by row along Y, then slice by
//! slice along Z. A row or slice is accepted only if every voxel in it is
//! solid and unvisited.

use bitvec::prelude::*;

use crate::engine_state::voxels::block::BlockRegistry;
use crate::engine_state::voxels::physics::aabb::Aabb;

use super::{block_index, BlockGrid, CHUNK_SIZE_XZ, CHUNK_SIZE_Y, CHUNK_VOLUME};

struct MergeGrid {
    solid: BitVec,
    visited: BitVec,
}

impl MergeGrid {
    fn new(blocks: &BlockGrid, registry: &BlockRegistry) -> Self {
        let mut solid = bitvec![0; CHUNK_VOLUME];
        for (index, block_type) in blocks.as_slice().iter().enumerate() {
            if registry.is_solid(*block_type) {
                solid.set(index, true);
            }
        }
        Self {
            solid,
            visited: bitvec![0; CHUNK_VOLUME],
        }
    }

    #[inline]
    fn open(&self, x: usize, y: usize, z: usize) -> bool {
        let index = block_index(x, y, z);
        self.solid[index] && !self.visited[index]
    }

    fn row_open(&self, x0: usize, x1: usize, y: usize, z: usize) -> bool {
        (x0..=x1).all(|x| self.open(x, y, z))
    }

    fn slice_open(&self, x0: usize, x1: usize, y0: usize, y1: usize, z: usize) -> bool {
        (y0..=y1).all(|y| self.row_open(x0, x1, y, z))
    }

    fn mark(&mut self, x0: usize, x1: usize, y0: usize, y1: usize, z0: usize, z1: usize) {
        for z in z0..=z1 {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    self.visited.set(block_index(x, y, z), true);
                }
            }
        }
    }
}

/// Runs the greedy merge over a chunk's blocks.
///
/// # Arguments
/// * `blocks` - The chunk's block grid
/// * `registry` - Decides which block types are solid
///
/// # Returns
/// One box per merged run, in chunk-local coordinates.
pub fn build_collision_boxes(blocks: &BlockGrid, registry: &BlockRegistry) -> Vec<Aabb> {
    let mut grid = MergeGrid::new(blocks, registry);
    let mut boxes = Vec::new();

    for z in 0..CHUNK_SIZE_XZ {
        for y in 0..CHUNK_SIZE_Y {
            for x in 0..CHUNK_SIZE_XZ {
                if !grid.open(x, y, z) {
                    continue;
                }

                let mut x_end = x;
                while x_end + 1 < CHUNK_SIZE_XZ && grid.open(x_end + 1, y, z) {
                    x_end += 1;
                }

                let mut y_end = y;
                while y_end + 1 < CHUNK_SIZE_Y && grid.row_open(x, x_end, y_end + 1, z) {
                    y_end += 1;
                }

                let mut z_end = z;
                while z_end + 1 < CHUNK_SIZE_XZ && grid.slice_open(x, x_end, y, y_end, z_end + 1) {
                    z_end += 1;
                }

                grid.mark(x, x_end, y, y_end, z, z_end);
                boxes.push(Aabb::from_block_range(x, y, z, x_end, y_end, z_end));
            }
        }
    }

    boxes
}

#[cfg(test)]
mod tests {
    use cgmath::Point3;

    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    #[test]
    fn solid_cube_collapses_to_one_box() {
        let mut blocks = BlockGrid::new();
        blocks.fill_layers(0, 15, BlockType::Stone);

        let boxes = build_collision_boxes(&blocks, &BlockRegistry::default());
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(boxes[0].max, Point3::new(16.0, 16.0, 16.0));
    }

    #[test]
    fn empty_chunk_has_no_boxes() {
        let boxes = build_collision_boxes(&BlockGrid::new(), &BlockRegistry::default());
        assert!(boxes.is_empty());
    }

    #[test]
    fn non_solid_blocks_are_ignored() {
        let mut blocks = BlockGrid::new();
        blocks.fill_layers(0, 0, BlockType::Water);
        blocks.set(4, 1, 4, BlockType::Rose);
        assert!(build_collision_boxes(&blocks, &BlockRegistry::default()).is_empty());
    }

    #[test]
    fn every_solid_voxel_is_covered_once() {
        let registry = BlockRegistry::default();
        let mut blocks = BlockGrid::new();
        blocks.fill_layers(0, 3, BlockType::Stone);
        blocks.set(5, 4, 5, BlockType::Dirt);
        blocks.set(6, 4, 5, BlockType::Dirt);
        blocks.set(9, 7, 2, BlockType::OakLog);
        blocks.set(0, 2, 0, BlockType::Air);

        let boxes = build_collision_boxes(&blocks, &registry);
        let covered: usize = boxes
            .iter()
            .map(|b| ((b.max.x - b.min.x) * (b.max.y - b.min.y) * (b.max.z - b.min.z)) as usize)
            .sum();
        let solid = blocks.as_slice().iter().filter(|b| registry.is_solid(**b)).count();
        assert_eq!(covered, solid);

        for (i, a) in boxes.iter().enumerate() {
            for b in boxes.iter().skip(i + 1) {
                assert!(!a.intersects(b));
            }
        }
    }
}
