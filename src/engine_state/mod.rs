//! # Engine State Module
//!
//! The core engine module that ties the viewer to the chunk streaming machinery.
//!
//! ## Key Components
//!
//! * `EngineState` - Owns the viewer and the chunk manager and advances them per frame
//! * `camera_state` - Camera, projection and frustum culling
//! * `rendering` - Vertex layout, greedy meshing and the meshing task
//! * `task_management` - The worker pool chunks are generated and meshed on
//! * `voxels` - Voxel data, chunks, terrain generation and the chunk scheduler
//!
//! ## Architecture
//!
//! `EngineState` is the central coordinator. It does no windowing or GPU work: a
//! frontend calls `update()` once per frame and uploads whatever
//! `ChunkManager::render_list()` reports as meshed.

use cgmath::Point3;
use log::info;
use web_time::Duration;

use camera_state::Viewer;
use voxels::manager::{ChunkManager, FrameStats};

use crate::config::WorldConfig;

pub mod camera_state;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// Height above the terrain surface at which the viewer starts.
const SPAWN_CLEARANCE: f32 = 20.0;

/// The main state container for the engine.
///
/// # Examples
///
/// ```no_run
/// use voxel_world::config::WorldConfig;
/// use voxel_world::engine_state::EngineState;
/// use web_time::Duration;
///
/// let mut engine_state = EngineState::new(WorldConfig::default());
/// for _ in 0..60 {
///     let stats = engine_state.update(Duration::from_millis(16));
///     println!("{stats}");
/// }
/// ```
pub struct EngineState {
    /// The camera the world is streamed around
    pub viewer: Viewer,
    /// Scheduler owning every chunk and the worker pool
    pub manager: ChunkManager,
    /// Frames processed so far
    frame: u64,
}

impl EngineState {
    /// Creates the engine with the viewer hovering over the middle of chunk `(0, 0)`.
    pub fn new(config: WorldConfig) -> Self {
        let manager = ChunkManager::new(config);
        let column = manager.generator().generate_column(8, 8);
        let spawn = Point3::new(8.0, column.surface_height as f32 + SPAWN_CLEARANCE, 8.0);
        let config = manager.config();
        info!(
            "World seed {}: spawning in {:?} at {:?}",
            config.seed, column.biome, spawn
        );
        let viewer = Viewer::new(spawn, config.min_render_distance, config.max_render_distance);

        EngineState {
            viewer,
            manager,
            frame: 0,
        }
    }

    /// Advances one frame: moves the viewer, then runs the chunk scheduler.
    ///
    /// # Arguments
    /// * `delta` - Time elapsed since the previous frame
    pub fn update(&mut self, delta: Duration) -> FrameStats {
        let speed = self.manager.config().viewer_speed;
        self.viewer.fly(speed * delta.as_secs_f32());
        self.frame += 1;
        self.manager.tick(&self.viewer)
    }

    /// Number of frames processed so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}
