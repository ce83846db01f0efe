//! Vertex data structures for voxel meshes.
//!
//! This module defines the vertex format emitted by the mesher. The layout is
//! plain old data so that a mesh can be handed to any GPU backend as raw bytes.

use cgmath::{Point3, Vector3};

/// A vertex of a chunk mesh.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes, world space)
/// - Normal: [f32; 3] (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes, in blocks, repeat per block)
/// - Texture Index: u32 (4 bytes)
/// - Tint: [f32; 3] (12 bytes, linear RGB in `[0, 1]`)
///
/// Total size: 48 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// World-space position
    pub position: [f32; 3],
    /// Unit normal of the face
    pub normal: [f32; 3],
    /// Texture coordinates in blocks; repeat across merged quads
    pub tex_coords: [f32; 2],
    /// Layer of the texture array
    pub texture_index: u32,
    /// Colour multiplier, white for untinted materials
    pub tint: [f32; 3],
}

impl Vertex {
    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `position` - World-space block coordinate of the corner
    /// * `normal` - Unit normal of the face the vertex belongs to
    /// * `tex_coords` - Texture coordinates, scaled by the size of the merged quad
    /// * `texture_index` - Index of the sub-texture in the texture array
    /// * `tint` - Colour multiplier for the texture
    pub fn new(
        position: Point3<i32>,
        normal: Vector3<f32>,
        tex_coords: [f32; 2],
        texture_index: u32,
        tint: [f32; 3],
    ) -> Self {
        Vertex {
            position: [position.x as f32, position.y as f32, position.z as f32],
            normal: normal.into(),
            tex_coords,
            texture_index,
            tint,
        }
    }

    /// The vertex as a fixed-size word array, usable as a hash key.
    pub fn as_key(&self) -> [u32; 12] {
        bytemuck::cast(*self)
    }
}
