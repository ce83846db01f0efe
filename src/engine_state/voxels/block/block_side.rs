//! # Block Side Module
//!
//! This module defines the six faces of a voxel and their geometric meaning:
//! which axis a face is perpendicular to and which way its normal points.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

/// The four faces that separate horizontally adjacent chunks.
pub const HORIZONTAL_SIDES: [BlockSide; 4] = [
    BlockSide::LEFT,
    BlockSide::RIGHT,
    BlockSide::BACK,
    BlockSide::FRONT,
];

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Returns the face perpendicular to `axis` (0 = X, 1 = Y, 2 = Z) whose normal
    /// points along the positive or negative direction of that axis.
    pub fn from_axis(axis: usize, positive: bool) -> Self {
        match (axis, positive) {
            (0, true) => BlockSide::RIGHT,
            (0, false) => BlockSide::LEFT,
            (1, true) => BlockSide::TOP,
            (1, false) => BlockSide::BOTTOM,
            (_, true) => BlockSide::FRONT,
            (_, false) => BlockSide::BACK,
        }
    }

    /// The face pointing the other way along the same axis.
    pub fn opposite(self) -> Self {
        BlockSide::from_axis(self.axis(), !self.is_positive())
    }

    /// The axis this face is perpendicular to.
    pub fn axis(self) -> usize {
        match self {
            BlockSide::LEFT | BlockSide::RIGHT => 0,
            BlockSide::BOTTOM | BlockSide::TOP => 1,
            BlockSide::FRONT | BlockSide::BACK => 2,
        }
    }

    /// Whether the face normal points along the positive axis direction.
    pub fn is_positive(self) -> bool {
        matches!(self, BlockSide::RIGHT | BlockSide::TOP | BlockSide::FRONT)
    }

    /// Unit normal of the face.
    pub fn normal(self) -> Vector3<f32> {
        let sign = if self.is_positive() { 1.0 } else { -1.0 };
        match self.axis() {
            0 => Vector3::new(sign, 0.0, 0.0),
            1 => Vector3::new(0.0, sign, 0.0),
            _ => Vector3::new(0.0, 0.0, sign),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_and_sign_round_trip() {
        for side in BlockSide::all() {
            assert_eq!(BlockSide::from_axis(side.axis(), side.is_positive()), side);
        }
        assert_eq!(BlockSide::TOP.normal(), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(BlockSide::FRONT.opposite(), BlockSide::BACK);
        assert_eq!(BlockSide::LEFT.normal(), Vector3::new(-1.0, 0.0, 0.0));
    }
}
