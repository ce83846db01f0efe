//! # Boundary Shell
//!
//! Helpers that relate a chunk's one-cell overscan shell to the edge cells of its
//! four horizontal neighbours.
//!
//! The shell cell on `side` at `(t, y)` mirrors the neighbour's own edge cell on
//! `side.opposite()` at the same `(t, y)`, where `t` runs along the shared face.

use cgmath::Point3;

use crate::engine_state::voxels::block::block_side::{BlockSide, HORIZONTAL_SIDES};

use super::{side_offset, Chunk, CHUNK_DIMENSION, CHUNK_HEIGHT};

impl Chunk {
    /// This chunk's own edge cell on `side`, at offset `t` along the face and height `y`.
    pub fn boundary_cell(side: BlockSide, t: i32, y: i32) -> Point3<i32> {
        match side {
            BlockSide::LEFT => Point3::new(0, y, t),
            BlockSide::RIGHT => Point3::new(CHUNK_DIMENSION - 1, y, t),
            BlockSide::BACK => Point3::new(t, y, 0),
            BlockSide::FRONT => Point3::new(t, y, CHUNK_DIMENSION - 1),
            BlockSide::TOP | BlockSide::BOTTOM => Point3::new(t, y, 0),
        }
    }

    /// The shell cell just beyond `side`, at offset `t` along the face and height `y`.
    pub fn shell_cell(side: BlockSide, t: i32, y: i32) -> Point3<i32> {
        let (dx, dz) = side_offset(side);
        let edge = Self::boundary_cell(side, t, y);
        Point3::new(edge.x + dx, edge.y, edge.z + dz)
    }

    /// The horizontal sides whose shared face contains the interior cell `local`.
    ///
    /// At most two sides are returned, for the cells along a vertical edge.
    pub fn sides_touching(local: Point3<i32>) -> impl Iterator<Item = BlockSide> {
        HORIZONTAL_SIDES.into_iter().filter(move |side| {
            let (t, y) = Self::face_offset(*side, local);
            Self::boundary_cell(*side, t, y) == local
        })
    }

    /// Position of `local` within the face plane of `side`, as `(t, y)`.
    pub(crate) fn face_offset(side: BlockSide, local: Point3<i32>) -> (i32, i32) {
        if side.axis() == 0 {
            (local.z, local.y)
        } else {
            (local.x, local.y)
        }
    }

    /// Copies the neighbour's edge cells into this chunk's shell on `side`.
    ///
    /// Returns whether any shell cell changed.
    pub fn absorb_neighbor_boundary(&mut self, side: BlockSide, neighbor: &Chunk) -> bool {
        let mut changed = false;
        for y in 0..CHUNK_HEIGHT {
            for t in 0..CHUNK_DIMENSION {
                let theirs = Self::boundary_cell(side.opposite(), t, y);
                let ours = Self::shell_cell(side, t, y);
                let material = neighbor.get_voxel(theirs.x, theirs.y, theirs.z);
                if self.get_voxel(ours.x, ours.y, ours.z) != material {
                    self.set_voxel(ours.x, ours.y, ours.z, material);
                    changed = true;
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::Material;
    use crate::engine_state::voxels::chunk::ChunkCoord;

    #[test]
    fn shell_cells_sit_one_step_past_the_edge() {
        assert_eq!(Chunk::shell_cell(BlockSide::LEFT, 3, 7), Point3::new(-1, 7, 3));
        assert_eq!(
            Chunk::shell_cell(BlockSide::FRONT, 3, 7),
            Point3::new(3, 7, CHUNK_DIMENSION)
        );
        for side in HORIZONTAL_SIDES {
            let cell = Chunk::shell_cell(side, 5, 1);
            assert!(Chunk::is_shell_coordinate(cell.x, cell.y, cell.z));
        }
    }

    #[test]
    fn edge_cells_report_the_faces_they_touch() {
        let corner: Vec<_> = Chunk::sides_touching(Point3::new(0, 4, CHUNK_DIMENSION - 1)).collect();
        assert_eq!(corner, vec![BlockSide::LEFT, BlockSide::FRONT]);
        assert_eq!(Chunk::sides_touching(Point3::new(5, 4, 5)).count(), 0);
    }

    #[test]
    fn absorbing_a_neighbor_mirrors_its_edge() {
        let mut left = Chunk::new(ChunkCoord::new(0, 0));
        let mut right = Chunk::new(ChunkCoord::new(1, 0));
        right.set_voxel(0, 10, 4, Material::STONE);

        assert!(left.absorb_neighbor_boundary(BlockSide::RIGHT, &right));
        assert_eq!(left.get_voxel(CHUNK_DIMENSION, 10, 4), Material::STONE);
        assert!(!left.absorb_neighbor_boundary(BlockSide::RIGHT, &right));

        right.set_voxel(0, 10, 4, Material::AIR);
        assert!(left.absorb_neighbor_boundary(BlockSide::RIGHT, &right));
        assert!(!left.is_voxel_active(CHUNK_DIMENSION, 10, 4));
    }
}
