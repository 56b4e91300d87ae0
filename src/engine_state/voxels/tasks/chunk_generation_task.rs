//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask`, which builds one chunk on
//! a worker thread: terrain, then light, then the mesh. It is scheduled when
//! a chunk enters the streaming window, or when a chunk's terrain arrived
//! from the network and only light and mesh remain.

use std::sync::Arc;

use log::{debug, error};
use web_time::{Duration, Instant};

use crate::core::MtResource;
use crate::engine_state::task_management::task::{Task, TaskResult};
use crate::engine_state::task_management::CancellationToken;
use crate::engine_state::voxels::block::BlockRegistry;
use crate::engine_state::voxels::chunk::{Chunk, ChunkCoord};
use crate::engine_state::voxels::generation::ChunkGenerator;
use crate::engine_state::voxels::world::chunk_table::ChunkTable;

use super::chunk_build::{relight_chunk, RelightOutcome};

/// A task that builds one chunk in the background.
///
/// The task checks its cancellation token before generating, between
/// stages and before storing anything, so a chunk evicted mid-build is
/// abandoned without touching the world again.
pub struct ChunkGenerationTask {
    /// The chunk being built
    chunk: MtResource<Chunk>,
    coord: ChunkCoord,
    /// Resident chunks, read for neighbor edges
    chunks: ChunkTable,
    registry: Arc<BlockRegistry>,
    /// Terrain source; `None` when the blocks are already installed
    generator: Option<Arc<dyn ChunkGenerator>>,
    token: CancellationToken,
}

impl ChunkGenerationTask {
    /// Creates a task that lights and meshes a chunk whose blocks are installed.
    ///
    /// # Arguments
    /// * `chunk` - The chunk to build
    /// * `chunks` - The world's chunk table
    /// * `registry` - Block properties
    /// * `token` - The chunk's job token
    pub fn new(
        chunk: MtResource<Chunk>,
        chunks: ChunkTable,
        registry: Arc<BlockRegistry>,
        token: CancellationToken,
    ) -> Self {
        let coord = chunk.get().coord();
        Self {
            chunk,
            coord,
            chunks,
            registry,
            generator: None,
            token,
        }
    }

    /// Makes the task produce the chunk's terrain first.
    pub fn generating_with(mut self, generator: Arc<dyn ChunkGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Chunk this job builds.
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    fn finished(&self, outcome: RelightOutcome, started: Instant) -> Box<dyn TaskResult + Send> {
        Box::new(ChunkGenerationTaskResult {
            coord: self.coord,
            outcome,
            elapsed: started.elapsed(),
        })
    }

    /// Runs terrain generation.
    ///
    /// # Returns
    /// `false` if the build should stop here.
    fn generate(&self, generator: &dyn ChunkGenerator) -> bool {
        if !self.chunk.get_mut().begin_generation() {
            return false;
        }
        debug!("Generating chunk {}", self.coord);
        let blocks = generator.generate(self.coord);

        if self.token.is_cancelled() {
            return false;
        }
        self.chunk.get_mut().install_blocks(blocks)
    }
}

impl Task for ChunkGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let started = Instant::now();
        if self.token.is_cancelled() {
            return self.finished(RelightOutcome::Cancelled, started);
        }

        if let Some(generator) = &self.generator {
            if !self.generate(generator.as_ref()) {
                let outcome = if self.token.is_cancelled() {
                    RelightOutcome::Cancelled
                } else {
                    RelightOutcome::Skipped
                };
                return self.finished(outcome, started);
            }
        }

        let outcome = relight_chunk(&self.chunk, &self.chunks, &self.registry, Some(&self.token));
        self.finished(outcome, started)
    }

    fn describe(&self) -> String {
        format!("chunk build {}", self.coord)
    }

    fn cancellation(&self) -> Option<&CancellationToken> {
        Some(&self.token)
    }

    fn failed(&self, reason: String) -> Box<dyn TaskResult + Send> {
        Box::new(ChunkGenerationFailed {
            chunk: self.chunk.clone(),
            coord: self.coord,
            reason,
        })
    }
}

/// The result of a chunk build.
pub struct ChunkGenerationTaskResult {
    coord: ChunkCoord,
    outcome: RelightOutcome,
    elapsed: Duration,
}

impl TaskResult for ChunkGenerationTaskResult {
    fn handle_result(self: Box<Self>) -> Vec<Box<dyn Task + Send>> {
        match self.outcome {
            RelightOutcome::Ready | RelightOutcome::Dirty => {
                debug!("Chunk {} built in {:?} ({:?})", self.coord, self.elapsed, self.outcome)
            }
            RelightOutcome::Cancelled => debug!("Chunk {} build cancelled", self.coord),
            RelightOutcome::Skipped => debug!("Chunk {} build skipped", self.coord),
        }
        Vec::new()
    }
}

/// Reported when generating a chunk panicked. The chunk is failed for good.
pub struct ChunkGenerationFailed {
    chunk: MtResource<Chunk>,
    coord: ChunkCoord,
    reason: String,
}

impl TaskResult for ChunkGenerationFailed {
    fn handle_result(self: Box<Self>) -> Vec<Box<dyn Task + Send>> {
        error!("Chunk {} generation panicked: {}", self.coord, self.reason);
        self.chunk.get_mut().mark_errored(self.reason);
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationMode;
    use crate::engine_state::voxels::chunk::ChunkState;
    use crate::engine_state::voxels::generation::TerrainGenerator;

    fn task_for(table: &ChunkTable, coord: ChunkCoord) -> (ChunkGenerationTask, CancellationToken) {
        let (chunk, token) = table.insert(coord).unwrap();
        let task = ChunkGenerationTask::new(chunk, table.clone(), Arc::new(BlockRegistry::default()), token.clone())
            .generating_with(Arc::new(TerrainGenerator::new(1, GenerationMode::Flat)));
        (task, token)
    }

    #[test]
    fn builds_a_ready_chunk() {
        let table = ChunkTable::new();
        let (task, _) = task_for(&table, ChunkCoord::new(0, 0));
        task.process().handle_result();
        let chunk = table.get(ChunkCoord::new(0, 0)).unwrap();
        assert_eq!(*chunk.get().state(), ChunkState::Ready);
        assert!(chunk.get().is_upload_pending());
    }

    #[test]
    fn cancelled_before_start_leaves_chunk_untouched() {
        let table = ChunkTable::new();
        let (task, token) = task_for(&table, ChunkCoord::new(2, 0));
        token.cancel();
        task.process().handle_result();
        let chunk = table.get(ChunkCoord::new(2, 0)).unwrap();
        assert_eq!(*chunk.get().state(), ChunkState::Unlit);
    }

    #[test]
    fn failure_marks_chunk_errored() {
        let table = ChunkTable::new();
        let (task, _) = task_for(&table, ChunkCoord::new(0, 1));
        task.failed("boom".into()).handle_result();
        let chunk = table.get(ChunkCoord::new(0, 1)).unwrap();
        assert_eq!(*chunk.get().state(), ChunkState::Errored("boom".into()));
    }
}
