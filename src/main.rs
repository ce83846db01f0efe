//! # Voxel World Entry Point
//!
//! Parses the optional seed, loads the configuration and hands over to the
//! library's `run()`.
//!
//! ## Usage
//!
//! ```bash
//! voxel-world [seed]
//! VOXEL_WORLD_CONFIG=world.json RUST_LOG=info voxel-world 42
//! ```

use std::process::ExitCode;

use voxel_world::config::{ConfigError, WorldConfig, USAGE};

fn main() -> ExitCode {
    let config = match WorldConfig::from_env_and_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(error) => return report(&error),
    };

    match voxel_world::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn report(error: &ConfigError) -> ExitCode {
    eprintln!("error: {error}");
    if error.is_usage_error() {
        eprintln!("{USAGE}");
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}
