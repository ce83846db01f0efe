//! Task for generating mesh data for chunks in a background thread.
//!
//! This module contains the `ChunkMeshGenerationTask` which runs the greedy mesher
//! over a checked-out chunk. The chunk travels to the worker with the task and comes
//! back, meshed, as the task's output.

use std::sync::Arc;

use crate::engine_state::{
    task_management::Task,
    voxels::{chunk::Chunk, terrain::TerrainGenerator},
};

/// A task that generates mesh data for a chunk in a background thread.
pub struct ChunkMeshGenerationTask {
    /// The chunk that needs mesh generation
    chunk: Box<Chunk>,
    /// Used by the mesher for biome tints
    generator: Arc<TerrainGenerator>,
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task.
    ///
    /// # Arguments
    /// * `chunk` - A generated chunk, owned by the task until it completes
    /// * `generator` - The world's terrain generator
    pub fn new(chunk: Box<Chunk>, generator: Arc<TerrainGenerator>) -> Self {
        ChunkMeshGenerationTask { chunk, generator }
    }
}

impl Task for ChunkMeshGenerationTask {
    type Output = Box<Chunk>;

    /// Builds the chunk's mesh and returns it in the `MESHED` state.
    fn process(mut self) -> Box<Chunk> {
        self.chunk.build_mesh(&self.generator);
        self.chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::task_management::TaskManager;
    use crate::engine_state::voxels::chunk::{ChunkCoord, ChunkState};

    #[test]
    fn meshing_runs_on_a_worker_and_returns_the_chunk() {
        let manager = TaskManager::new(1);
        let generator = Arc::new(TerrainGenerator::new(5));
        let mut chunk = Box::new(Chunk::new(ChunkCoord::new(0, 0)));
        chunk.generate(&generator);

        let handle = manager.publish_task(ChunkMeshGenerationTask::new(chunk, generator));
        let chunk = handle.wait().expect("meshing failed");
        assert_eq!(chunk.state(), ChunkState::MESHED);
        assert!(chunk.mesh().is_some_and(|mesh| !mesh.is_empty()));
    }
}
