//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.
//! The numeric value of each variant is its wire ordinal: chunk payloads carry
//! one byte per block holding exactly this value.

use num_derive::FromPrimitive;

/// Enumerates all possible block types in the voxel world.
///
/// The `FromPrimitive` derive allows conversion from the single-byte wire
/// ordinal. Properties such as solidity or light emission are not stored here;
/// they are looked up in the [`super::BlockRegistry`].
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive)]
pub enum BlockType {
    /// Empty space.
    #[default]
    Air = 0,
    Grass = 1,
    Dirt = 2,
    Stone = 3,
    /// Grass with a snow-covered top, found on high mountains.
    SnowGrass = 4,
    OakLeaves = 5,
    OakLog = 6,
    /// Flower placed on plains grass. Not solid.
    Rose = 7,
    /// Flower placed on plains grass. Not solid.
    Dandelion = 8,
    Water = 9,
    Gravel = 10,
    Sand = 11,
    Podzol = 12,
    IronOre = 13,
    CoalOre = 14,
    Bedrock = 15,
    OakPlanks = 16,
}

impl BlockType {
    /// Number of block types.
    pub const COUNT: usize = 17;

    /// Every block type, in ordinal order.
    pub const ALL: [BlockType; Self::COUNT] = [
        BlockType::Air,
        BlockType::Grass,
        BlockType::Dirt,
        BlockType::Stone,
        BlockType::SnowGrass,
        BlockType::OakLeaves,
        BlockType::OakLog,
        BlockType::Rose,
        BlockType::Dandelion,
        BlockType::Water,
        BlockType::Gravel,
        BlockType::Sand,
        BlockType::Podzol,
        BlockType::IronOre,
        BlockType::CoalOre,
        BlockType::Bedrock,
        BlockType::OakPlanks,
    ];

    /// Converts a wire ordinal to a `BlockType`.
    ///
    /// # Arguments
    /// * `ordinal` - The byte value read from a chunk payload
    ///
    /// # Returns
    /// The corresponding `BlockType`, or `None` if no variant has that ordinal.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        num::FromPrimitive::from_u8(ordinal)
    }

    /// The wire ordinal of this block type.
    #[inline]
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Lower-case name used in logs and texture lookups.
    pub fn name(self) -> &'static str {
        match self {
            BlockType::Air => "air",
            BlockType::Grass => "grass",
            BlockType::Dirt => "dirt",
            BlockType::Stone => "stone",
            BlockType::SnowGrass => "snow_grass",
            BlockType::OakLeaves => "oak_leaves",
            BlockType::OakLog => "oak_log",
            BlockType::Rose => "rose",
            BlockType::Dandelion => "dandelion",
            BlockType::Water => "water",
            BlockType::Gravel => "gravel",
            BlockType::Sand => "sand",
            BlockType::Podzol => "podzol",
            BlockType::IronOre => "iron_ore",
            BlockType::CoalOre => "coal_ore",
            BlockType::Bedrock => "bedrock",
            BlockType::OakPlanks => "oak_planks",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_match_declaration_order() {
        for (index, block_type) in BlockType::ALL.iter().enumerate() {
            assert_eq!(block_type.ordinal() as usize, index);
            assert_eq!(BlockType::from_ordinal(index as u8), Some(*block_type));
        }
    }

    #[test]
    fn unknown_ordinal_is_rejected() {
        assert_eq!(BlockType::from_ordinal(BlockType::COUNT as u8), None);
        assert_eq!(BlockType::from_ordinal(u8::MAX), None);
    }
}
