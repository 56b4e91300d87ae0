//! # Voxels
//!
//! Everything that describes the world itself, independent of how it is
//! drawn or transported:
//!
//! * **block**: block types, faces and the immutable [`block::BlockRegistry`]
//! * **chunk**: 16x256x16 columns of blocks and their derived caches
//! * **generation**: procedural terrain
//! * **lighting**: sky and block light
//! * **physics**: boxes, entities and the fixed-step integrator
//! * **world**: the streaming [`world::VoxelWorld`]
//! * **tasks**: background chunk builds
//! * **storage**: the disk-load hook
//!
//! ## Data Flow
//!
//! 1. The world creates chunks as the streaming window moves
//! 2. A build task generates each chunk's terrain on a worker
//! 3. The same task computes light and the texture-bucketed mesh
//! 4. The engine hands finished meshes to the render backend
//! 5. Edits rebuild light and mesh of the touched chunks from scratch

pub mod block;
pub mod chunk;
pub mod generation;
pub mod lighting;
pub mod noise;
pub mod physics;
pub mod storage;
pub mod tasks;
pub mod world;
