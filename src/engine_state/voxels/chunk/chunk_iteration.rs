//! # Chunk Iteration Module
//!
//! This module provides an iterator over every non-air block in a chunk, in
//! storage order (X fastest, then Z, then Y). Most of a generated chunk is
//! air above the surface, so the mesher and the light-source scan only pay
//! for the blocks that exist.

use cgmath::Point3;

use crate::engine_state::voxels::block::block_type::BlockType;

use super::{BlockGrid, CHUNK_LAYER_SIZE, CHUNK_SIZE_XZ, CHUNK_VOLUME};

/// An iterator over all non-air blocks in a [`BlockGrid`].
///
/// Yields the local position of each block together with its type.
pub struct ChunkBlockIterator<'a> {
    /// The blocks being iterated over
    grid: &'a BlockGrid,
    /// Next storage index to inspect
    current_offset: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` positioned before the first block.
    ///
    /// # Arguments
    /// * `grid` - The blocks to iterate over
    pub fn new(grid: &'a BlockGrid) -> Self {
        ChunkBlockIterator {
            grid,
            current_offset: 0,
        }
    }

    /// Converts a storage index back into local `(x, y, z)` coordinates.
    fn position_of(offset: usize) -> Point3<usize> {
        let y = offset / CHUNK_LAYER_SIZE;
        let rest = offset % CHUNK_LAYER_SIZE;
        Point3::new(rest % CHUNK_SIZE_XZ, y, rest / CHUNK_SIZE_XZ)
    }
}

impl<'a> Iterator for ChunkBlockIterator<'a> {
    type Item = (Point3<usize>, BlockType);

    fn next(&mut self) -> Option<Self::Item> {
        let blocks = self.grid.as_slice();
        while self.current_offset < CHUNK_VOLUME {
            let offset = self.current_offset;
            self.current_offset += 1;

            let block_type = blocks[offset];
            if block_type != BlockType::Air {
                return Some((Self::position_of(offset), block_type));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_only_placed_blocks_with_positions() {
        let mut grid = BlockGrid::new();
        grid.set(3, 200, 7, BlockType::Stone);
        grid.set(15, 0, 15, BlockType::Sand);

        let found: Vec<_> = ChunkBlockIterator::new(&grid).collect();
        assert_eq!(
            found,
            vec![
                (Point3::new(15, 0, 15), BlockType::Sand),
                (Point3::new(3, 200, 7), BlockType::Stone),
            ]
        );
    }
}
