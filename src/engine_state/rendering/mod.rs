//! Rendering-side data for the voxel engine.
//!
//! This module turns chunk voxel data into meshes ready for upload. It does not talk
//! to a GPU itself: the host application takes the per-chunk meshes from the chunk
//! manager's render list and draws them with whatever backend it uses.

pub mod meshing;
pub mod tasks;
mod vertex;

// Re-export commonly used types
pub use meshing::Mesh;
pub use vertex::Vertex;
