//! Merged quads and their corner geometry.

use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::block::{block_side::BlockSide, block_type::Material};

/// A merged, axis-aligned rectangle of identical voxel faces.
///
/// The rectangle lies in the plane perpendicular to `block_side.axis()`. It starts at
/// `corner` (chunk-local) and spans `width` blocks along the first in-plane axis and
/// `height` blocks along the second, where the in-plane axes are `(d + 1) % 3` and
/// `(d + 2) % 3` for face axis `d`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Corner of the rectangle with the smallest in-plane coordinates
    pub corner: Point3<i32>,
    /// Extent along the first in-plane axis
    pub width: i32,
    /// Extent along the second in-plane axis
    pub height: i32,
    /// Material whose face this is
    pub material: Material,
    /// Which way the face points
    pub block_side: BlockSide,
}

impl Face {
    /// The two in-plane axes for faces perpendicular to `axis`.
    pub fn plane_axes(axis: usize) -> (usize, usize) {
        ((axis + 1) % 3, (axis + 2) % 3)
    }

    /// Chunk-local corners, counter-clockwise when viewed from the side the normal
    /// points to, each paired with its offset `(a, b)` in blocks along the two
    /// in-plane axes.
    pub fn corners(&self) -> [(Point3<i32>, i32, i32); 4] {
        let (u, v) = Self::plane_axes(self.block_side.axis());
        let mut du = Vector3::new(0, 0, 0);
        let mut dv = Vector3::new(0, 0, 0);
        du[u] = self.width;
        dv[v] = self.height;

        let p = self.corner;
        let (w, h) = (self.width, self.height);
        if self.block_side.is_positive() {
            [(p, 0, 0), (p + du, w, 0), (p + du + dv, w, h), (p + dv, 0, h)]
        } else {
            [(p, 0, 0), (p + dv, 0, h), (p + du + dv, w, h), (p + du, w, 0)]
        }
    }

    /// Chunk-local cell that owns the face at `corner`.
    ///
    /// Faces sit on the boundary plane of their voxel, so a positive-facing face's
    /// corner lies one cell past the voxel along the face axis.
    pub fn source_cell(&self) -> Point3<i32> {
        let mut cell = self.corner;
        if self.block_side.is_positive() {
            cell[self.block_side.axis()] -= 1;
        }
        cell
    }

    /// Texture coordinates for a corner at offset `(a, b)`.
    ///
    /// Top and bottom faces map the in-plane axes directly. Side faces map the
    /// horizontal axis to `s` and the vertical axis to `t`, with `t = 0` at the top
    /// edge so textures stand upright.
    pub fn tex_coords(&self, a: i32, b: i32) -> [f32; 2] {
        match self.block_side.axis() {
            // u = Y, v = Z
            0 => [b as f32, (self.width - a) as f32],
            // u = Z, v = X
            1 => [b as f32, a as f32],
            // u = X, v = Y
            _ => [a as f32, (self.height - b) as f32],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(side: BlockSide) -> Face {
        Face {
            corner: Point3::new(0, 0, 0),
            width: 2,
            height: 3,
            material: Material::STONE,
            block_side: side,
        }
    }

    #[test]
    fn corners_wind_towards_the_normal() {
        for side in BlockSide::all() {
            let corners = face(side).corners();
            let a = corners[1].0 - corners[0].0;
            let b = corners[2].0 - corners[0].0;
            let cross = a.cast::<f32>().unwrap().cross(b.cast::<f32>().unwrap());
            let normal = side.normal();
            assert!(cross.x * normal.x + cross.y * normal.y + cross.z * normal.z > 0.0, "{side:?}");
        }
    }

    #[test]
    fn source_cell_is_the_voxel_behind_the_face() {
        let mut right = face(BlockSide::RIGHT);
        right.corner = Point3::new(16, 4, 7);
        assert_eq!(right.source_cell(), Point3::new(15, 4, 7));

        let mut front = face(BlockSide::FRONT);
        front.corner = Point3::new(3, 4, 16);
        assert_eq!(front.source_cell(), Point3::new(3, 4, 15));

        let mut left = face(BlockSide::LEFT);
        left.corner = Point3::new(0, 4, 7);
        assert_eq!(left.source_cell(), Point3::new(0, 4, 7));
    }

    #[test]
    fn texture_coordinates_span_the_quad() {
        let top = face(BlockSide::TOP);
        assert_eq!(top.tex_coords(2, 3), [3.0, 2.0]);
        let side = face(BlockSide::FRONT);
        assert_eq!(side.tex_coords(0, 3), [0.0, 0.0]);
        assert_eq!(side.tex_coords(2, 0), [2.0, 3.0]);
    }
}
