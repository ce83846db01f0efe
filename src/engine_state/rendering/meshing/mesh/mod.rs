//! Mesh generation and manipulation for voxel rendering.
//!
//! # Architecture
//! - [`Mesh`]: Vertices and indices of one chunk in world space
//! - [`Face`]: A merged rectangle of identical voxel faces
//! - Greedy meshing: sweeps each axis slice by slice and merges matching faces
//!
//! # Usage
//! ```no_run
//! use voxel_world::engine_state::rendering::Mesh;
//! use voxel_world::engine_state::voxels::{chunk::{Chunk, ChunkCoord}, terrain::TerrainGenerator};
//!
//! let generator = TerrainGenerator::new(1337);
//! let mut chunk = Chunk::new(ChunkCoord::new(0, 0));
//! chunk.generate(&generator);
//! let mesh = Mesh::greedy(&chunk, &generator);
//! ```

mod face;
mod greedy;
mod mesh;

pub use face::Face;
pub use greedy::greedy_faces;
pub use mesh::*;
