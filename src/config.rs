//! # World Configuration
//!
//! Runtime settings for the world: seed, streaming radii, render distances and the
//! worker pool size. Values come from defaults, optionally overridden by a JSON file
//! named in `VOXEL_WORLD_CONFIG`, and finally by the seed given on the command line.
//!
//! ## Example file
//!
//! ```json
//! { "seed": 42, "load_radius": 8, "max_render_distance": 320.0 }
//! ```
//!
//! Missing fields keep their defaults. Out-of-range values are clamped with a warning.

use std::fmt;
use std::path::{Path, PathBuf};

use log::warn;
use serde::Deserialize;

use crate::engine_state::voxels::chunk::CHUNK_DIMENSION;

/// Environment variable naming an optional JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "VOXEL_WORLD_CONFIG";

/// Usage line printed for bad command lines.
pub const USAGE: &str = "usage: voxel-world [seed]";

const MAX_LOAD_RADIUS: u32 = 32;

/// Errors raised while assembling the configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The seed argument is not a decimal `u32`
    InvalidSeed(String),
    /// More than one positional argument was given
    TooManyArguments(usize),
    /// The configuration file could not be read
    Io {
        /// The file named in the environment
        path: PathBuf,
        /// Underlying read error
        source: std::io::Error,
    },
    /// The configuration file is not valid JSON for `WorldConfig`
    Parse {
        /// The file named in the environment
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Whether the error comes from the command line, as opposed to the environment.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            ConfigError::InvalidSeed(_) | ConfigError::TooManyArguments(_)
        )
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSeed(value) => {
                write!(f, "invalid seed {value:?}: expected an integer in 0..={}", u32::MAX)
            }
            ConfigError::TooManyArguments(count) => {
                write!(f, "expected at most one argument, got {count}")
            }
            ConfigError::Io { path, source } => {
                write!(f, "cannot read config {}: {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "cannot parse config {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Settings that shape world generation and streaming.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Drives every procedural decision; equal seeds give equal worlds
    pub seed: u32,
    /// Chunks within this many chunk widths of the viewer are kept resident
    pub load_radius: u32,
    /// Upper bound on chunks instantiated per frame
    pub max_chunks_per_frame: usize,
    /// Near clipping plane, world units
    pub min_render_distance: f32,
    /// Far clipping plane, world units; also widens the unload radius
    pub max_render_distance: f32,
    /// Size of the worker pool
    pub worker_threads: usize,
    /// Frames simulated by the headless driver
    pub demo_frames: u32,
    /// Fly-through speed of the headless driver, world units per second
    pub viewer_speed: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        let parallelism = std::thread::available_parallelism().map_or(2, |n| n.get());
        WorldConfig {
            seed: 1337,
            load_radius: 6,
            max_chunks_per_frame: 8,
            min_render_distance: 0.1,
            max_render_distance: 256.0,
            worker_threads: parallelism.saturating_sub(1).max(1),
            demo_frames: 600,
            viewer_speed: 8.0,
        }
    }
}

impl WorldConfig {
    /// Reads a configuration file. Fields absent from the file keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: WorldConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(config.validated())
    }

    /// Builds the configuration from `VOXEL_WORLD_CONFIG` (if set) and the command
    /// line arguments after the program name.
    pub fn from_env_and_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => WorldConfig::from_file(Path::new(&path))?,
            None => WorldConfig::default(),
        };
        if let Some(seed) = parse_seed_args(args)? {
            config.seed = seed;
        }
        Ok(config)
    }

    /// Clamps out-of-range values, warning about each one.
    pub fn validated(mut self) -> Self {
        let load_radius = self.load_radius.clamp(1, MAX_LOAD_RADIUS);
        if load_radius != self.load_radius {
            warn!("load_radius {} clamped to {}", self.load_radius, load_radius);
            self.load_radius = load_radius;
        }
        if self.max_chunks_per_frame == 0 {
            warn!("max_chunks_per_frame must be at least 1");
            self.max_chunks_per_frame = 1;
        }
        if self.worker_threads == 0 {
            warn!("worker_threads must be at least 1");
            self.worker_threads = 1;
        }
        if !(self.min_render_distance > 0.0) {
            warn!("min_render_distance {} reset to 0.1", self.min_render_distance);
            self.min_render_distance = 0.1;
        }
        if !(self.max_render_distance > self.min_render_distance) {
            let fallback = self.min_render_distance + CHUNK_DIMENSION as f32;
            warn!(
                "max_render_distance {} raised to {}",
                self.max_render_distance, fallback
            );
            self.max_render_distance = fallback;
        }
        self
    }

    /// Chunks farther than this, in chunk widths, are unloaded. Always larger than
    /// the load radius so chunks at the edge do not thrash.
    pub fn unload_radius(&self) -> f32 {
        let by_load = self.load_radius as f32 + 2.0;
        let by_render = self.max_render_distance / CHUNK_DIMENSION as f32 + 1.0;
        by_load.max(by_render)
    }
}

/// Parses the optional seed argument.
///
/// # Returns
/// `None` with no arguments, the seed with one valid argument.
pub fn parse_seed_args<I>(args: I) -> Result<Option<u32>, ConfigError>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    match args.as_slice() {
        [] => Ok(None),
        [seed] => seed
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidSeed(seed.clone())),
        more => Err(ConfigError::TooManyArguments(more.len())),
    }
}
