//! # Block Module
//!
//! This module provides block type definitions, block face handling and the
//! immutable [`BlockRegistry`] that answers every "what is this block like"
//! question: solidity, transparency, light emission and per-face textures.
//!
//! The registry is built once and then shared by reference (or `Arc`) with
//! every system that needs it, including the worker threads.
//!
//! ```
//! use voxel_world::engine_state::voxels::block::{block_face::BlockFace, block_type::BlockType, BlockRegistry};
//!
//! let registry = BlockRegistry::default();
//! assert!(registry.is_solid(BlockType::Stone));
//! assert!(registry.is_transparent(BlockType::OakLeaves));
//! assert_ne!(
//!     registry.texture(BlockType::Grass, BlockFace::Top),
//!     registry.texture(BlockType::Grass, BlockFace::Bottom),
//! );
//! ```

use std::collections::HashMap;

use block_face::BlockFace;
use block_type::BlockType;

use crate::engine_state::voxels::lighting::MAX_LIGHT_LEVEL;

pub mod block_face;
pub mod block_type;

/// Index into the registry's texture table. Meshes are bucketed by this id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u16);

/// Texture assigned to faces of blocks that declare none.
pub const MISSING_TEXTURE: &str = "missing";

/// Static properties of one block type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockDescriptor {
    /// The block type these properties belong to.
    pub block_type: BlockType,
    /// Whether entities collide with this block and whether it takes part in collision volumes.
    pub solid: bool,
    /// Whether light passes through this block.
    pub transparent: bool,
    /// Block light emitted by this block, 0..=15.
    pub light_emission: u8,
    /// Texture per face, indexed by `BlockFace as usize`.
    pub textures: [TextureId; 6],
}

/// Immutable table of [`BlockDescriptor`]s, one per [`BlockType`].
#[derive(Clone, Debug)]
pub struct BlockRegistry {
    descriptors: Vec<BlockDescriptor>,
    texture_names: Vec<String>,
}

impl BlockRegistry {
    /// Starts a builder pre-loaded with the default block properties.
    pub fn builder() -> BlockRegistryBuilder {
        BlockRegistryBuilder::default()
    }

    /// Returns the descriptor of a block type.
    #[inline]
    pub fn descriptor(&self, block_type: BlockType) -> &BlockDescriptor {
        &self.descriptors[block_type as usize]
    }

    /// The descriptor of empty space.
    pub fn air(&self) -> &BlockDescriptor {
        self.descriptor(BlockType::Air)
    }

    /// Whether entities collide with the block.
    #[inline]
    pub fn is_solid(&self, block_type: BlockType) -> bool {
        self.descriptor(block_type).solid
    }

    /// Whether light and neighbor faces show through the block.
    #[inline]
    pub fn is_transparent(&self, block_type: BlockType) -> bool {
        self.descriptor(block_type).transparent
    }

    /// Block light level the block emits, 0 for none.
    #[inline]
    pub fn light_emission(&self, block_type: BlockType) -> u8 {
        self.descriptor(block_type).light_emission
    }

    /// Returns `true` if a block hides the faces of blocks next to it.
    ///
    /// Only solid, non-transparent blocks occlude; leaves, water, flowers and air do not.
    #[inline]
    pub fn occludes(&self, block_type: BlockType) -> bool {
        let descriptor = self.descriptor(block_type);
        descriptor.solid && !descriptor.transparent
    }

    /// Returns the texture used for one face of a block type.
    #[inline]
    pub fn texture(&self, block_type: BlockType, face: BlockFace) -> TextureId {
        self.descriptor(block_type).textures[face as usize]
    }

    /// Resolves a texture id back to its name.
    pub fn texture_name(&self, texture: TextureId) -> Option<&str> {
        self.texture_names.get(texture.0 as usize).map(String::as_str)
    }

    /// Looks up the id assigned to a texture name.
    pub fn texture_id(&self, name: &str) -> Option<TextureId> {
        self.texture_names
            .iter()
            .position(|candidate| candidate == name)
            .map(|index| TextureId(index as u16))
    }

    /// Number of distinct textures referenced by the registry.
    pub fn texture_count(&self) -> usize {
        self.texture_names.len()
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        BlockRegistry::builder().build()
    }
}

#[derive(Clone, Debug)]
struct BlockEntry {
    solid: bool,
    transparent: bool,
    light_emission: u8,
    textures: [String; 6],
}

impl BlockEntry {
    fn new(solid: bool, transparent: bool, top: &str, bottom: &str, side: &str) -> Self {
        Self {
            solid,
            transparent,
            light_emission: 0,
            textures: face_textures(top, bottom, side),
        }
    }

    fn uniform(solid: bool, transparent: bool, texture: &str) -> Self {
        Self::new(solid, transparent, texture, texture, texture)
    }
}

fn face_textures(top: &str, bottom: &str, side: &str) -> [String; 6] {
    let mut textures: [String; 6] = Default::default();
    for face in BlockFace::all() {
        textures[face as usize] = match face {
            BlockFace::Top => top,
            BlockFace::Bottom => bottom,
            _ => side,
        }
        .to_string();
    }
    textures
}

/// Builder for a [`BlockRegistry`], used to override default block properties.
///
/// ```
/// use voxel_world::engine_state::voxels::block::{block_type::BlockType, BlockRegistry};
///
/// let registry = BlockRegistry::builder()
///     .with_light_emission(BlockType::OakPlanks, 15)
///     .build();
/// assert_eq!(registry.light_emission(BlockType::OakPlanks), 15);
/// ```
#[derive(Clone, Debug)]
pub struct BlockRegistryBuilder {
    entries: Vec<BlockEntry>,
}

impl Default for BlockRegistryBuilder {
    fn default() -> Self {
        let entries = BlockType::ALL
            .iter()
            .map(|block_type| match block_type {
                BlockType::Air => BlockEntry::uniform(false, true, MISSING_TEXTURE),
                BlockType::Grass => BlockEntry::new(true, false, "grass_top", "dirt", "grass_side"),
                BlockType::Dirt => BlockEntry::uniform(true, false, "dirt"),
                BlockType::Stone => BlockEntry::uniform(true, false, "stone"),
                BlockType::SnowGrass => {
                    BlockEntry::new(true, false, "snow", "dirt", "grass_block_snow")
                }
                BlockType::OakLeaves => BlockEntry::uniform(true, true, "oak_leaves"),
                BlockType::OakLog => {
                    BlockEntry::new(true, false, "oak_log_top", "oak_log_top", "oak_log")
                }
                BlockType::Rose => BlockEntry::uniform(false, true, "rose"),
                BlockType::Dandelion => BlockEntry::uniform(false, true, "dandelion"),
                BlockType::Water => BlockEntry::uniform(false, true, "water_still"),
                BlockType::Gravel => BlockEntry::uniform(true, false, "andesite"),
                BlockType::Sand => BlockEntry::uniform(true, false, "sand"),
                BlockType::Podzol => {
                    BlockEntry::new(true, false, "podzol_top", "dirt", "podzol_side")
                }
                BlockType::IronOre => BlockEntry::uniform(true, false, "iron_ore"),
                BlockType::CoalOre => BlockEntry::uniform(true, false, "coal_ore"),
                BlockType::Bedrock => BlockEntry::uniform(true, false, "bedrock"),
                BlockType::OakPlanks => BlockEntry::uniform(true, false, "oak_planks"),
            })
            .collect();

        Self { entries }
    }
}

impl BlockRegistryBuilder {
    /// Sets the block light a block type emits, clamped to 15.
    pub fn with_light_emission(mut self, block_type: BlockType, level: u8) -> Self {
        self.entries[block_type as usize].light_emission = level.min(MAX_LIGHT_LEVEL);
        self
    }

    /// Sets whether a block type is solid.
    pub fn with_solidity(mut self, block_type: BlockType, solid: bool) -> Self {
        self.entries[block_type as usize].solid = solid;
        self
    }

    /// Sets whether light passes through a block type.
    pub fn with_transparency(mut self, block_type: BlockType, transparent: bool) -> Self {
        self.entries[block_type as usize].transparent = transparent;
        self
    }

    /// Replaces the textures of a block type.
    pub fn with_face_textures(
        mut self,
        block_type: BlockType,
        top: &str,
        bottom: &str,
        side: &str,
    ) -> Self {
        self.entries[block_type as usize].textures = face_textures(top, bottom, side);
        self
    }

    /// Freezes the builder into a registry.
    ///
    /// Texture ids are assigned in order of first appearance walking block
    /// ordinals then faces, so the same builder always yields the same ids.
    pub fn build(self) -> BlockRegistry {
        let mut texture_names: Vec<String> = vec![MISSING_TEXTURE.to_string()];
        let mut texture_ids: HashMap<String, TextureId> = HashMap::new();
        texture_ids.insert(MISSING_TEXTURE.to_string(), TextureId(0));

        let descriptors = self
            .entries
            .into_iter()
            .zip(BlockType::ALL)
            .map(|(entry, block_type)| {
                let mut textures = [TextureId(0); 6];
                for (slot, name) in textures.iter_mut().zip(entry.textures) {
                    *slot = *texture_ids.entry(name.clone()).or_insert_with(|| {
                        texture_names.push(name);
                        TextureId((texture_names.len() - 1) as u16)
                    });
                }

                BlockDescriptor {
                    block_type,
                    solid: entry.solid,
                    transparent: entry.transparent,
                    light_emission: entry.light_emission,
                    textures,
                }
            })
            .collect();

        BlockRegistry {
            descriptors,
            texture_names,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_flags() {
        let registry = BlockRegistry::default();
        for block_type in [BlockType::Air, BlockType::Water, BlockType::Rose, BlockType::Dandelion] {
            assert!(!registry.is_solid(block_type), "{block_type:?}");
            assert!(registry.is_transparent(block_type), "{block_type:?}");
        }
        assert!(registry.is_solid(BlockType::OakLeaves));
        assert!(registry.is_transparent(BlockType::OakLeaves));
        assert!(!registry.occludes(BlockType::OakLeaves));
        assert!(registry.occludes(BlockType::Bedrock));
        assert!(BlockType::ALL.iter().all(|b| registry.light_emission(*b) == 0));
    }

    #[test]
    fn shared_texture_names_share_ids() {
        let registry = BlockRegistry::default();
        assert_eq!(
            registry.texture(BlockType::Grass, BlockFace::Bottom),
            registry.texture(BlockType::Dirt, BlockFace::North)
        );
        let side = registry.texture(BlockType::OakLog, BlockFace::East);
        assert_eq!(registry.texture_name(side), Some("oak_log"));
        assert_eq!(registry.texture_id("oak_log"), Some(side));
    }

    #[test]
    fn emission_override_is_clamped() {
        let registry = BlockRegistry::builder()
            .with_light_emission(BlockType::Stone, 40)
            .build();
        assert_eq!(registry.light_emission(BlockType::Stone), MAX_LIGHT_LEVEL);
    }

    #[test]
    fn flag_overrides_change_occlusion() {
        let registry = BlockRegistry::builder()
            .with_solidity(BlockType::Water, true)
            .with_transparency(BlockType::Stone, true)
            .with_solidity(BlockType::Rose, true)
            .with_transparency(BlockType::Rose, false)
            .build();
        assert!(registry.is_solid(BlockType::Water));
        assert!(!registry.occludes(BlockType::Water));
        assert!(registry.is_transparent(BlockType::Stone));
        assert!(!registry.occludes(BlockType::Stone));
        assert!(registry.occludes(BlockType::Rose));
        assert!(registry.occludes(BlockType::Dirt));
    }

    #[test]
    fn face_texture_override() {
        let defaults = BlockRegistry::default();
        let registry = BlockRegistry::builder()
            .with_face_textures(BlockType::Dirt, "mud_top", "mud_bottom", "mud_side")
            .build();

        let name = |face| registry.texture_name(registry.texture(BlockType::Dirt, face));
        assert_eq!(name(BlockFace::Top), Some("mud_top"));
        assert_eq!(name(BlockFace::Bottom), Some("mud_bottom"));
        for face in [BlockFace::North, BlockFace::South, BlockFace::East, BlockFace::West] {
            assert_eq!(name(face), Some("mud_side"));
        }
        // grass still uses the old dirt texture for its bottom
        assert!(registry.texture_id("dirt").is_some());
        assert_eq!(registry.texture_count(), defaults.texture_count() + 3);
    }
}
