//! # Block Face Module
//!
//! This module defines the six faces of a voxel block, the direction each one
//! points in and the directional shading applied to it when meshing.

/// Represents the six possible faces of a voxel block.
///
/// The discriminant is used to index per-face tables such as the texture
/// assignments of a [`super::BlockDescriptor`].
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, PartialOrd, Ord)]
pub enum BlockFace {
    /// Facing positive Y.
    Top = 0,
    /// Facing negative Y.
    Bottom = 1,
    /// Facing negative Z.
    North = 2,
    /// Facing positive Z.
    South = 3,
    /// Facing positive X.
    East = 4,
    /// Facing negative X.
    West = 5,
}

impl BlockFace {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// The order is: [Top, Bottom, North, South, East, West]
    pub fn all() -> [BlockFace; 6] {
        [
            BlockFace::Top,
            BlockFace::Bottom,
            BlockFace::North,
            BlockFace::South,
            BlockFace::East,
            BlockFace::West,
        ]
    }

    /// The four faces whose neighbors lie in another chunk column.
    pub fn horizontal() -> [BlockFace; 4] {
        [
            BlockFace::North,
            BlockFace::South,
            BlockFace::East,
            BlockFace::West,
        ]
    }

    /// Unit offset from a block to the neighbor this face looks at.
    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            BlockFace::Top => (0, 1, 0),
            BlockFace::Bottom => (0, -1, 0),
            BlockFace::North => (0, 0, -1),
            BlockFace::South => (0, 0, 1),
            BlockFace::East => (1, 0, 0),
            BlockFace::West => (-1, 0, 0),
        }
    }

    /// The face pointing the other way.
    pub fn opposite(self) -> BlockFace {
        match self {
            BlockFace::Top => BlockFace::Bottom,
            BlockFace::Bottom => BlockFace::Top,
            BlockFace::North => BlockFace::South,
            BlockFace::South => BlockFace::North,
            BlockFace::East => BlockFace::West,
            BlockFace::West => BlockFace::East,
        }
    }

    /// Fixed directional brightness multiplier applied to every vertex of this face.
    ///
    /// # Returns
    /// Top 1.0, South 0.9, East 0.95, West 0.85, North 0.8, Bottom 0.75.
    pub fn shading_factor(self) -> f32 {
        match self {
            BlockFace::Top => 1.0,
            BlockFace::South => 0.9,
            BlockFace::East => 0.95,
            BlockFace::West => 0.85,
            BlockFace::North => 0.8,
            BlockFace::Bottom => 0.75,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_offsets_cancel() {
        for face in BlockFace::all() {
            let (ax, ay, az) = face.offset();
            let (bx, by, bz) = face.opposite().offset();
            assert_eq!((ax + bx, ay + by, az + bz), (0, 0, 0));
        }
    }

    #[test]
    fn discriminants_index_all() {
        for (index, face) in BlockFace::all().iter().enumerate() {
            assert_eq!(*face as usize, index);
        }
    }
}
