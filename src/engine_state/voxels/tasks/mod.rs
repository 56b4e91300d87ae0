//! # Voxel Task System
//!
//! Background work of the chunk pipeline. A chunk is built in one job on a
//! worker: terrain first (unless it already arrived from the network), then
//! light, then the mesh. The relight stage is also run on its own, on the
//! calling thread, after block edits.

pub mod chunk_build;
pub mod chunk_generation_task;

pub use chunk_build::{relight_chunk, RelightOutcome};
pub use chunk_generation_task::ChunkGenerationTask;
