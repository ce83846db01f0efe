//! # Chunk Manager
//!
//! The per-frame scheduler that streams chunks around the viewer.
//!
//! Each call to `tick()` runs, in order:
//! 1. Unload chunks beyond the unload radius that no task holds
//! 2. Queue every missing coordinate within the load radius, nearest first
//! 3. Instantiate a bounded number of queued coordinates as `UNLOADED` chunks
//! 4. Recompute the view frustum and flag each resident chunk's visibility
//! 5. Submit generation tasks for visible `UNLOADED` chunks, nearest first
//! 6. Submit meshing tasks for visible `GENERATED` chunks, nearest first
//! 7. Poll every outstanding task without blocking and check finished chunks back in
//!
//! Submitting a task checks its chunk out of the table, which adds the coordinate to
//! the in-flight set; polling checks it back in. The main thread never waits on a
//! worker.

use std::fmt;
use std::sync::Arc;

use cgmath::Point3;
use log::{debug, trace, warn};
use web_time::Instant;

use crate::config::WorldConfig;
use crate::core::MtResource;
use crate::engine_state::camera_state::Viewer;
use crate::engine_state::rendering::{tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask, Mesh};
use crate::engine_state::task_management::{TaskHandle, TaskManager};
use crate::engine_state::voxels::{
    block::block_type::Material,
    chunk::{Chunk, ChunkCoord, ChunkState},
    tasks::chunk_generation_task::ChunkGenerationTask,
    terrain::TerrainGenerator,
    world::ChunkTable,
};

/// The two kinds of background work done on a chunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskKind {
    /// Filling an `UNLOADED` chunk with terrain
    GENERATION,
    /// Building the mesh of a `GENERATED` chunk
    MESHING,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::GENERATION => write!(f, "generation"),
            TaskKind::MESHING => write!(f, "meshing"),
        }
    }
}

/// A submitted task and the chunk it holds.
struct PendingTask {
    coord: ChunkCoord,
    kind: TaskKind,
    submitted: Instant,
    handle: TaskHandle<Box<Chunk>>,
}

/// Counters describing one frame of the scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Chunks in the table, including checked-out ones
    pub resident: usize,
    /// Chunks inside the view frustum
    pub visible: usize,
    /// Chunks with an up-to-date mesh
    pub meshed: usize,
    /// Chunks checked out by tasks after polling
    pub in_flight: usize,
    /// Coordinates still waiting to be instantiated
    pub queued: usize,
    /// Chunks dropped this frame
    pub unloaded: usize,
    /// Generation tasks published this frame
    pub submitted_generation: usize,
    /// Meshing tasks published this frame
    pub submitted_meshing: usize,
    /// Tasks whose chunk was checked back in this frame
    pub completed: usize,
    /// Vertices across all meshed chunks
    pub vertices: usize,
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "resident {} | visible {} | meshed {} | in flight {} | queued {} | vertices {}",
            self.resident, self.visible, self.meshed, self.in_flight, self.queued, self.vertices
        )
    }
}

/// What a renderer needs to know about one resident chunk.
#[derive(Debug, Clone)]
pub struct ChunkRenderInfo {
    /// Chunk coordinate
    pub coord: ChunkCoord,
    /// World-space block position of the chunk's `(0, 0, 0)` cell
    pub origin: Point3<i32>,
    /// Current state, or the state at check-out for chunks held by a task
    pub state: ChunkState,
    /// Inside the view frustum this frame
    pub visible: bool,
    /// Present only for `MESHED` chunks
    pub mesh: Option<Arc<Mesh>>,
}

/// Streams chunks around the viewer and owns the workers that fill and mesh them.
pub struct ChunkManager {
    config: WorldConfig,
    generator: Arc<TerrainGenerator>,
    table: MtResource<ChunkTable>,
    task_manager: TaskManager,
    pending: Vec<PendingTask>,
}

impl ChunkManager {
    /// Creates a manager with an empty table and a worker pool sized from `config`.
    pub fn new(config: WorldConfig) -> Self {
        let generator = Arc::new(TerrainGenerator::new(config.seed));
        let task_manager = TaskManager::new(config.worker_threads);
        ChunkManager {
            config,
            generator,
            table: MtResource::new(ChunkTable::new()),
            task_manager,
            pending: Vec::new(),
        }
    }

    /// The configuration the manager was built with.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The shared terrain generator.
    pub fn generator(&self) -> &Arc<TerrainGenerator> {
        &self.generator
    }

    /// The chunk table. Lock it with `get()` for inspection.
    pub fn table(&self) -> &MtResource<ChunkTable> {
        &self.table
    }

    /// Number of submitted tasks not yet checked back in.
    pub fn pending_tasks(&self) -> usize {
        self.pending.len()
    }

    /// Runs one frame of the scheduler.
    ///
    /// # Arguments
    /// * `viewer` - Current camera; drives distances and frustum culling
    ///
    /// # Panics
    /// Panics if a generation or meshing task failed. Both are total over their input,
    /// so a failure means the world is corrupt.
    pub fn tick(&mut self, viewer: &Viewer) -> FrameStats {
        let mut stats = FrameStats::default();
        let shared = self.table.clone();
        let mut table = shared.get_mut();
        let viewer_chunk = viewer.chunk_position();

        stats.unloaded = table.unload_beyond(viewer_chunk, self.config.unload_radius());

        let radius = self.config.load_radius as i32;
        let center = viewer.chunk();
        let mut desired = Vec::new();
        for dz in -radius..=radius {
            for dx in -radius..=radius {
                let coord = ChunkCoord::new(center.x + dx, center.z + dz);
                let distance = coord.distance_to(viewer_chunk);
                if distance <= self.config.load_radius as f32 && !table.contains(coord) {
                    desired.push((coord, distance));
                }
            }
        }
        desired.sort_by(|a, b| a.1.total_cmp(&b.1));
        for (coord, _) in desired {
            table.enqueue(coord);
        }

        table.drain_queue(self.config.max_chunks_per_frame);

        let frustum = viewer.frustum();
        for (coord, slot) in table.slots_mut() {
            slot.visible = frustum.intersects_chunk(coord);
        }

        stats.submitted_generation =
            self.submit(&mut table, viewer, ChunkState::UNLOADED, TaskKind::GENERATION);
        stats.submitted_meshing =
            self.submit(&mut table, viewer, ChunkState::GENERATED, TaskKind::MESHING);

        stats.completed = self.poll(&mut table);

        stats.resident = table.len();
        stats.in_flight = table.in_flight().len();
        stats.queued = table.queued_len();
        for (_, slot) in table.slots() {
            if slot.visible {
                stats.visible += 1;
            }
            if slot.state() == ChunkState::MESHED {
                stats.meshed += 1;
                stats.vertices += slot
                    .chunk()
                    .and_then(|chunk| chunk.mesh())
                    .map_or(0, |mesh| mesh.vertices().len());
            }
        }
        stats
    }

    /// Checks out every visible chunk in `state` that no task holds, nearest first, and
    /// hands each to a new task of `kind`.
    fn submit(
        &mut self,
        table: &mut ChunkTable,
        viewer: &Viewer,
        state: ChunkState,
        kind: TaskKind,
    ) -> usize {
        let viewer_chunk = viewer.chunk_position();
        let mut candidates: Vec<(ChunkCoord, f32)> = table
            .slots()
            .filter(|(_, slot)| slot.visible && !slot.is_checked_out() && slot.state() == state)
            .map(|(coord, _)| (coord, coord.distance_to(viewer_chunk)))
            .collect();
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut submitted = 0;
        for (coord, _) in candidates {
            let Some(chunk) = table.check_out(coord) else {
                continue;
            };
            trace!("Submitting {} for chunk ({}, {})", kind, coord.x, coord.z);
            let generator = Arc::clone(&self.generator);
            let handle = match kind {
                TaskKind::GENERATION => self
                    .task_manager
                    .publish_task(ChunkGenerationTask::new(chunk, generator)),
                TaskKind::MESHING => self
                    .task_manager
                    .publish_task(ChunkMeshGenerationTask::new(chunk, generator)),
            };
            self.pending.push(PendingTask {
                coord,
                kind,
                submitted: Instant::now(),
                handle,
            });
            submitted += 1;
        }
        submitted
    }

    /// Checks finished chunks back in.
    fn poll(&mut self, table: &mut ChunkTable) -> usize {
        let mut completed = 0;
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for task in self.pending.drain(..) {
            match task.handle.try_take() {
                None => still_pending.push(task),
                Some(Ok(chunk)) => {
                    debug!(
                        "Chunk ({}, {}) {} finished in {:?}",
                        task.coord.x,
                        task.coord.z,
                        task.kind,
                        task.submitted.elapsed()
                    );
                    table.check_in(chunk);
                    completed += 1;
                }
                Some(Err(failure)) => panic!(
                    "{} task for chunk ({}, {}) failed: {}",
                    task.kind, task.coord.x, task.coord.z, failure
                ),
            }
        }
        self.pending = still_pending;
        completed
    }

    /// Places `material` at a world position. See `ChunkTable::place_voxel`.
    pub fn place_voxel(&mut self, position: Point3<f32>, material: Material) -> bool {
        let mut table = self.table.get_mut();
        let placed = table.place_voxel(position, material);
        if !placed {
            warn_if_in_flight(&table, position);
        }
        placed
    }

    /// Clears the voxel at a world position. See `ChunkTable::delete_voxel`.
    pub fn delete_voxel(&mut self, position: Point3<f32>) -> bool {
        let mut table = self.table.get_mut();
        let deleted = table.delete_voxel(position);
        if !deleted {
            warn_if_in_flight(&table, position);
        }
        deleted
    }

    /// Whether the block at a world position is occupied.
    ///
    /// Only chunks in their table slot are consulted. While a task holds a chunk,
    /// including a generated chunk that is only being remeshed after an edit, every
    /// cell in it reads as empty.
    pub fn is_voxel_active(&self, position: Point3<f32>) -> bool {
        self.table.get().is_voxel_active(position)
    }

    /// The material at a world position; `AIR` under the same conditions as
    /// `is_voxel_active` reports empty.
    pub fn get_voxel(&self, position: Point3<f32>) -> Material {
        self.table.get().get_voxel(position)
    }

    /// Every resident chunk with its visibility, state and current mesh.
    pub fn render_list(&self) -> Vec<ChunkRenderInfo> {
        let table = self.table.get();
        let mut list: Vec<ChunkRenderInfo> = table
            .slots()
            .map(|(coord, slot)| {
                let state = slot.state();
                let mesh = if state == ChunkState::MESHED {
                    slot.chunk().and_then(|chunk| chunk.mesh()).cloned()
                } else {
                    None
                };
                ChunkRenderInfo {
                    coord,
                    origin: coord.origin(),
                    state,
                    visible: slot.visible,
                    mesh,
                }
            })
            .collect();
        list.sort_by_key(|info| info.coord);
        list
    }
}

fn warn_if_in_flight(table: &ChunkTable, position: Point3<f32>) {
    let coord = ChunkCoord::from_world(position);
    if table.is_in_flight(coord) {
        warn!(
            "Edit at ({:.1}, {:.1}, {:.1}) refused: chunk ({}, {}) is held by a task",
            position.x, position.y, position.z, coord.x, coord.z
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WorldConfig {
        WorldConfig {
            seed: 11,
            load_radius: 2,
            max_chunks_per_frame: 4,
            worker_threads: 2,
            ..WorldConfig::default()
        }
    }

    #[test]
    fn instantiation_is_bounded_per_frame() {
        let mut manager = ChunkManager::new(config());
        let viewer = Viewer::new(Point3::new(8.0, 90.0, 8.0), 0.1, 256.0);
        let stats = manager.tick(&viewer);
        assert_eq!(stats.resident, 4);
        assert!(stats.queued > 0);
        assert_eq!(stats.submitted_meshing, 0);
        assert_eq!(
            stats.in_flight + stats.completed,
            stats.submitted_generation,
            "every submission is either in flight or back"
        );
    }

    #[test]
    fn nearest_chunks_are_instantiated_first() {
        let mut manager = ChunkManager::new(WorldConfig {
            max_chunks_per_frame: 1,
            ..config()
        });
        let viewer = Viewer::new(Point3::new(8.0, 90.0, 8.0), 0.1, 256.0);
        manager.tick(&viewer);
        assert!(manager.table().get().contains(ChunkCoord::new(0, 0)));
    }

    #[test]
    fn task_kinds_display() {
        assert_eq!(TaskKind::GENERATION.to_string(), "generation");
        assert_eq!(TaskKind::MESHING.to_string(), "meshing");
    }
}
