//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which fills a checked-out chunk
//! with terrain on a worker thread. The task owns the chunk while it runs and hands
//! it back as its output, so the chunk table never shares it with a worker.

use std::sync::Arc;

use crate::engine_state::{
    task_management::Task,
    voxels::{chunk::Chunk, terrain::TerrainGenerator},
};

/// A task that generates chunk data asynchronously.
pub struct ChunkGenerationTask {
    /// The chunk to fill, moved out of the chunk table
    chunk: Box<Chunk>,
    /// Shared, read-only terrain generator
    generator: Arc<TerrainGenerator>,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `chunk` - The chunk to generate, owned by the task until it completes
    /// * `generator` - The world's terrain generator
    pub fn new(chunk: Box<Chunk>, generator: Arc<TerrainGenerator>) -> Self {
        ChunkGenerationTask { chunk, generator }
    }
}

impl Task for ChunkGenerationTask {
    type Output = Box<Chunk>;

    /// Populates the chunk's grid and shell and returns it in the `GENERATED` state.
    fn process(mut self) -> Box<Chunk> {
        self.chunk.generate(&self.generator);
        self.chunk
    }
}
