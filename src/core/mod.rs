//! # Core Module
//!
//! Shared-ownership primitives used throughout the world. Chunks live in a
//! table on the main thread while workers generate, light and mesh them, so
//! every chunk is held through an [`MtResource`].
//!
//! ## Usage
//! ```rust
//! use voxel_world::core::MtResource;
//!
//! let counter = MtResource::new(0);
//! *counter.get_mut() += 1;
//! assert_eq!(*counter.get(), 1);
//! ```

pub mod mt_resource;

pub use mt_resource::MtResource;
