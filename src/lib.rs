#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]
#![allow(clippy::module_inception)]

//! # Voxel World
//!
//! An infinite, procedurally generated voxel world streamed around a moving viewer.
//!
//! The crate covers everything between the seed and the vertex buffers: terrain with
//! biomes, caves, ores and trees; chunk storage with a boundary shell so each chunk
//! can be meshed alone; greedy meshing; and a per-frame scheduler that loads, culls,
//! generates, meshes and unloads chunks on a worker pool.
//!
//! ## Key Modules
//!
//! * `config` - `WorldConfig`, loaded from defaults, a JSON file and the command line
//! * `core` - Shared-state primitives
//! * `engine_state` - The viewer, the chunk manager and everything under them
//!
//! ## Usage
//!
//! ```no_run
//! use voxel_world::config::WorldConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     voxel_world::run(WorldConfig::default())
//! }
//! ```
//!
//! A windowed frontend would instead own an `EngineState`, call `update()` each frame
//! and draw the meshes from `ChunkManager::render_list()`.

use log::info;
use web_time::{Duration, Instant};

pub mod config;
pub mod core;
pub mod engine_state;

pub use config::{ConfigError, WorldConfig};
pub use engine_state::EngineState;

/// Fixed timestep of the headless driver.
pub const FRAME_TIME: Duration = Duration::from_millis(16);

/// Frames between two logged summaries.
const STATS_INTERVAL: u32 = 60;

/// Initialises logging and flies the viewer through the world for
/// `config.demo_frames` frames, logging a summary every second of simulated time.
pub fn run(config: WorldConfig) -> anyhow::Result<()> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init()?;

    info!("Logger initialized");
    info!(
        "Seed {}, load radius {}, unload radius {:.1}, {} workers",
        config.seed,
        config.load_radius,
        config.unload_radius(),
        config.worker_threads
    );

    let frames = config.demo_frames;
    let started = Instant::now();
    let mut engine_state = EngineState::new(config);

    for frame in 1..=frames {
        let stats = engine_state.update(FRAME_TIME);
        if frame % STATS_INTERVAL == 0 || frame == frames {
            let position = engine_state.viewer.position();
            info!(
                "Frame {frame} at ({:.0}, {:.0}, {:.0}): {stats}",
                position.x, position.y, position.z
            );
        }
        std::thread::sleep(FRAME_TIME);
    }

    info!("Ran {} frames in {:?}", frames, started.elapsed());
    Ok(())
}
