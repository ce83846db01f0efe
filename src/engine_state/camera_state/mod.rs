//! # Camera State Management
//!
//! This module handles all viewer-related functionality including:
//! - Camera position and orientation tracking
//! - View and projection matrix calculations
//! - Chunk visibility determination based on the view frustum
//!
//! ## Core Components
//! - `Camera`: Represents the camera's position and orientation in 3D space
//! - `Projection`: Manages the camera's projection matrix
//! - `Frustum`: Six clipping planes used to cull chunks
//! - `Viewer`: What the chunk manager consumes each frame

use cgmath::{Deg, InnerSpace, Matrix4, Point2, Point3, Vector3};

use super::voxels::chunk::{ChunkCoord, CHUNK_DIMENSION};

pub mod camera;
pub mod frustum;

pub use frustum::Frustum;

/// Vertical field of view of the default projection.
pub const DEFAULT_FOVY: Deg<f32> = Deg(70.0);

/// The camera and projection the world is streamed and culled for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewer {
    /// The current camera position and orientation
    pub camera: camera::Camera,
    /// Perspective settings; the far plane bounds visibility
    pub projection: camera::Projection,
}

impl Viewer {
    /// Creates a viewer at `position` looking along +X.
    ///
    /// # Arguments
    /// * `position` - World-space position of the camera
    /// * `min_render_distance` - Near clipping plane
    /// * `max_render_distance` - Far clipping plane
    pub fn new(position: Point3<f32>, min_render_distance: f32, max_render_distance: f32) -> Self {
        Viewer {
            camera: camera::Camera::new(position, Deg(0.0), Deg(-10.0)),
            projection: camera::Projection::new(
                1920,
                1080,
                DEFAULT_FOVY,
                min_render_distance,
                max_render_distance,
            ),
        }
    }

    /// World-space camera position.
    pub fn position(&self) -> Point3<f32> {
        self.camera.position
    }

    /// Horizontal position in (fractional) chunk units.
    pub fn chunk_position(&self) -> Point2<f32> {
        Point2::new(
            self.camera.position.x / CHUNK_DIMENSION as f32,
            self.camera.position.z / CHUNK_DIMENSION as f32,
        )
    }

    /// The chunk the viewer stands in.
    pub fn chunk(&self) -> ChunkCoord {
        ChunkCoord::from_world(self.camera.position)
    }

    /// Combined projection and view matrix.
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection.calc_matrix() * self.camera.calc_matrix()
    }

    /// The current view frustum.
    pub fn frustum(&self) -> Frustum {
        Frustum::from_matrix(self.view_projection())
    }

    /// Moves the viewer horizontally along its facing direction.
    pub fn fly(&mut self, distance: f32) {
        let forward = self.camera.forward();
        let horizontal = Vector3::new(forward.x, 0.0, forward.z);
        if horizontal.magnitude2() > f32::EPSILON {
            self.camera.position += horizontal.normalize() * distance;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_position_is_fractional() {
        let viewer = Viewer::new(Point3::new(24.0, 70.0, -8.0), 0.1, 256.0);
        assert_eq!(viewer.chunk_position(), Point2::new(1.5, -0.5));
        assert_eq!(viewer.chunk(), ChunkCoord::new(1, -1));
    }

    #[test]
    fn flying_keeps_altitude() {
        let mut viewer = Viewer::new(Point3::new(0.0, 70.0, 0.0), 0.1, 256.0);
        viewer.fly(10.0);
        assert!((viewer.position().x - 10.0).abs() < 1e-4);
        assert_eq!(viewer.position().y, 70.0);
    }
}
