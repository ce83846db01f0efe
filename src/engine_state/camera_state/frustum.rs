//! View-frustum planes extracted from a view-projection matrix.

use cgmath::{InnerSpace, Matrix4, Point3, Vector3, Vector4};

use crate::engine_state::voxels::chunk::{ChunkCoord, CHUNK_DIMENSION, CHUNK_HEIGHT};

/// The six clipping planes of a camera, normals pointing inwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// `(a, b, c, d)` with `a*x + b*y + c*z + d >= 0` inside. Left, right, bottom,
    /// top, near, far.
    planes: [Vector4<f32>; 6],
}

impl Frustum {
    /// Extracts the planes of a view-projection matrix with WGPU depth (`0..1`).
    pub fn from_matrix(view_projection: Matrix4<f32>) -> Self {
        let m = view_projection;
        let row = |i: usize| Vector4::new(m.x[i], m.y[i], m.z[i], m.w[i]);
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        let planes = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r2, r3 - r2].map(|plane| {
            let length = Vector3::new(plane.x, plane.y, plane.z).magnitude();
            if length > f32::EPSILON {
                plane / length
            } else {
                plane
            }
        });
        Frustum { planes }
    }

    /// Whether any part of the sphere may be visible. Spheres entirely behind any
    /// plane are culled.
    pub fn intersects_sphere(&self, center: Point3<f32>, radius: f32) -> bool {
        self.planes.iter().all(|plane| {
            plane.x * center.x + plane.y * center.y + plane.z * center.z + plane.w >= -radius
        })
    }

    /// Tests the bounding sphere of a chunk's full-height box.
    pub fn intersects_chunk(&self, coord: ChunkCoord) -> bool {
        let (center, radius) = chunk_bounding_sphere(coord);
        self.intersects_sphere(center, radius)
    }
}

/// Centre and radius of the sphere enclosing a chunk's box.
pub fn chunk_bounding_sphere(coord: ChunkCoord) -> (Point3<f32>, f32) {
    let origin = coord.origin();
    let half = Vector3::new(
        CHUNK_DIMENSION as f32 / 2.0,
        CHUNK_HEIGHT as f32 / 2.0,
        CHUNK_DIMENSION as f32 / 2.0,
    );
    let center = Point3::new(
        origin.x as f32 + half.x,
        origin.y as f32 + half.y,
        origin.z as f32 + half.z,
    );
    (center, half.magnitude())
}
