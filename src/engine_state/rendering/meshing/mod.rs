//! Mesh generation for voxel rendering.
//!
//! Converts the voxel grid of a chunk, together with its boundary shell, into an
//! indexed triangle mesh with as few quads as the greedy algorithm can manage.
//!
//! # Performance Considerations
//! - Greedy meshing minimizes vertex count
//! - Identical vertices are shared between neighbouring quads
//! - Faces on chunk borders are emitted by exactly one of the two chunks

/// Core mesh generation algorithms and data structures.
mod mesh;

pub use mesh::*;
