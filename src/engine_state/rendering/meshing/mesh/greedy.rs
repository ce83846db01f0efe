//! Greedy meshing implementation for voxel rendering.
//!
//! This module implements the greedy meshing algorithm which combines adjacent coplanar
//! faces with the same material and orientation into larger rectangles, significantly
//! reducing the number of vertices needed to render a chunk.
//!
//! # Face rules
//! For every pair of cells `a`, `b` adjacent along an axis:
//! - exactly one active: the active cell shows a face towards the empty one
//! - both active, different materials, at least one transparent: the cell with the
//!   higher render priority shows a face towards the other
//! - otherwise no face
//!
//! A face is only emitted when the cell showing it lies inside the chunk grid. Shell
//! cells are consulted for occlusion, but their faces belong to the neighbour, so a
//! shared boundary is drawn exactly once across the two chunks.

use bitvec::prelude::*;
use cgmath::Point3;

use crate::engine_state::voxels::{
    block::{block_side::BlockSide, block_type::Material},
    chunk::{Chunk, CHUNK_DIMENSION, CHUNK_HEIGHT},
};

use super::face::Face;

/// Dimensions of the chunk grid along X, Y and Z.
const DIMENSIONS: [i32; 3] = [CHUNK_DIMENSION, CHUNK_HEIGHT, CHUNK_DIMENSION];

/// What a single cell boundary contributes to the mask of a slice.
type FaceKey = (Material, BlockSide);

/// Determines the face, if any, on the boundary between `a` and the cell after it
/// along `axis`.
fn face_key(chunk: &Chunk, a: [i32; 3], axis: usize) -> Option<FaceKey> {
    let mut b = a;
    b[axis] += 1;

    let first = chunk.get_voxel(a[0], a[1], a[2]);
    let second = chunk.get_voxel(b[0], b[1], b[2]);

    let (owner, material, positive) = match (first.is_active(), second.is_active()) {
        (true, false) => (a, first, true),
        (false, true) => (b, second, false),
        (true, true)
            if first != second && (first.is_transparent() || second.is_transparent()) =>
        {
            if first.render_priority() >= second.render_priority() {
                (a, first, true)
            } else {
                (b, second, false)
            }
        }
        _ => return None,
    };

    if !Chunk::is_interior(owner[0], owner[1], owner[2]) {
        return None;
    }
    Some((material, BlockSide::from_axis(axis, positive)))
}

/// Generates the merged faces of a chunk.
///
/// # Arguments
/// * `chunk` - The chunk to mesh; its shell is used for occlusion at the edges
///
/// # Returns
/// Every visible face of the chunk, merged into maximal rectangles row by row.
///
/// # Performance
/// Each axis is swept slice by slice. A slice builds a mask of face keys, then grows
/// rectangles first along the first in-plane axis and then along the second, marking
/// covered cells in a bit mask so every cell is consumed exactly once.
pub fn greedy_faces(chunk: &Chunk) -> Vec<Face> {
    let mut faces = Vec::new();

    for axis in 0..3 {
        let (u, v) = Face::plane_axes(axis);
        let (width, height) = (DIMENSIONS[u], DIMENSIONS[v]);
        let area = (width * height) as usize;

        let mut mask: Vec<Option<FaceKey>> = vec![None; area];
        let mut consumed = bitvec![0; area];

        for slice in -1..DIMENSIONS[axis] {
            for j in 0..height {
                for i in 0..width {
                    let mut cell = [0; 3];
                    cell[axis] = slice;
                    cell[u] = i;
                    cell[v] = j;
                    mask[(i + j * width) as usize] = face_key(chunk, cell, axis);
                }
            }
            consumed.fill(false);

            for j in 0..height {
                let mut i = 0;
                while i < width {
                    let index = (i + j * width) as usize;
                    let Some(key) = mask[index] else {
                        i += 1;
                        continue;
                    };
                    if consumed[index] {
                        i += 1;
                        continue;
                    }

                    let extends = |n: usize| !consumed[n] && mask[n] == Some(key);

                    let mut run = 1;
                    while i + run < width && extends(index + run as usize) {
                        run += 1;
                    }

                    let mut rows = 1;
                    'grow: while j + rows < height {
                        let row_start = (i + (j + rows) * width) as usize;
                        for k in 0..run as usize {
                            if !extends(row_start + k) {
                                break 'grow;
                            }
                        }
                        rows += 1;
                    }

                    for row in 0..rows {
                        let row_start = (i + (j + row) * width) as usize;
                        consumed[row_start..row_start + run as usize].fill(true);
                    }

                    let mut corner = Point3::new(0, 0, 0);
                    corner[axis] = slice + 1;
                    corner[u] = i;
                    corner[v] = j;
                    faces.push(Face {
                        corner,
                        width: run,
                        height: rows,
                        material: key.0,
                        block_side: key.1,
                    });

                    i += run;
                }
            }
        }
    }

    faces
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::engine_state::voxels::chunk::ChunkCoord;
    use crate::engine_state::voxels::terrain::TerrainGenerator;

    /// One block-sized piece of a merged face, in world coordinates.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    struct UnitFace {
        corner: [i32; 3],
        side: BlockSide,
        material: Material,
    }

    fn unit_faces(chunk: &Chunk) -> Vec<UnitFace> {
        let origin = chunk.origin();
        let mut units = Vec::new();
        for face in greedy_faces(chunk) {
            let (u, v) = Face::plane_axes(face.block_side.axis());
            for a in 0..face.width {
                for b in 0..face.height {
                    let mut corner = face.corner;
                    corner[u] += a;
                    corner[v] += b;
                    units.push(UnitFace {
                        corner: [corner.x + origin.x, corner.y + origin.y, corner.z + origin.z],
                        side: face.block_side,
                        material: face.material,
                    });
                }
            }
        }
        units
    }

    fn generated(generator: &TerrainGenerator, coord: ChunkCoord) -> Chunk {
        let mut chunk = Chunk::new(coord);
        chunk.generate(generator);
        chunk
    }

    /// The face the cell pair `(first, second)` must show, `second` lying on the
    /// positive side of `first`.
    fn required_face(first: Material, second: Material) -> Option<(Material, bool)> {
        match (first.is_active(), second.is_active()) {
            (true, false) => Some((first, true)),
            (false, true) => Some((second, false)),
            (true, true)
                if first != second && (first.is_transparent() || second.is_transparent()) =>
            {
                if first.render_priority() >= second.render_priority() {
                    Some((first, true))
                } else {
                    Some((second, false))
                }
            }
            _ => None,
        }
    }

    #[test]
    fn one_voxel_has_six_faces() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0));
        chunk.set_voxel(3, 3, 3, Material::DIRT);
        let faces = greedy_faces(&chunk);
        assert_eq!(faces.len(), 6);
        for side in BlockSide::all() {
            assert_eq!(faces.iter().filter(|f| f.block_side == side).count(), 1);
        }
    }

    #[test]
    fn transparent_neighbours_show_the_higher_priority_face() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0));
        chunk.set_voxel(3, 3, 3, Material::STONE);
        chunk.set_voxel(4, 3, 3, Material::WATER);

        let faces = greedy_faces(&chunk);
        let internal: Vec<_> = faces
            .iter()
            .filter(|f| f.block_side.axis() == 0 && f.corner.x == 4)
            .collect();
        assert_eq!(internal.len(), 1);
        assert_eq!(internal[0].material, Material::STONE);
        assert_eq!(internal[0].block_side, BlockSide::RIGHT);
        assert_eq!(faces.len(), 11);
    }

    #[test]
    fn opaque_neighbours_merge_without_internal_faces() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0));
        chunk.set_voxel(3, 3, 3, Material::STONE);
        chunk.set_voxel(4, 3, 3, Material::DIRT);
        assert_eq!(greedy_faces(&chunk).len(), 10);

        chunk.set_voxel(4, 3, 3, Material::STONE);
        assert_eq!(greedy_faces(&chunk).len(), 6);
    }

    #[test]
    fn water_touching_water_has_no_internal_face() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0));
        chunk.set_voxel(3, 3, 3, Material::WATER);
        chunk.set_voxel(3, 3, 4, Material::WATER);
        assert_eq!(greedy_faces(&chunk).len(), 6);
    }

    #[test]
    fn shell_occludes_but_never_owns_faces() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0));
        chunk.set_voxel(CHUNK_DIMENSION - 1, 5, 5, Material::STONE);
        chunk.set_voxel(CHUNK_DIMENSION, 5, 5, Material::STONE);
        chunk.set_voxel(CHUNK_DIMENSION, 9, 9, Material::STONE);

        let faces = greedy_faces(&chunk);
        assert_eq!(faces.len(), 5);
        assert!(faces.iter().all(|f| f.block_side != BlockSide::RIGHT));
        let left: Vec<_> = faces.iter().filter(|f| f.block_side == BlockSide::LEFT).collect();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].corner.x, CHUNK_DIMENSION - 1);
    }

    #[test]
    fn neighbouring_generated_chunks_share_their_boundary_faces() {
        let left = ChunkCoord::new(0, 0);
        let right = ChunkCoord::new(1, 0);
        for seed in [0, 1, 7, 1337, 2024] {
            let generator = TerrainGenerator::new(seed);
            let a = generated(&generator, left);
            let b = generated(&generator, right);

            let mut seen = HashSet::new();
            let mut boundary = HashSet::new();
            for unit in unit_faces(&a).into_iter().chain(unit_faces(&b)) {
                let key = (unit.corner, unit.side.axis());
                assert!(seen.insert(key), "seed {seed}: face at {:?} emitted twice", unit.corner);
                if unit.side.axis() == 0 && unit.corner[0] == CHUNK_DIMENSION {
                    boundary.insert(unit);
                }
            }

            let mut expected = HashSet::new();
            for y in 0..CHUNK_HEIGHT {
                for z in 0..CHUNK_DIMENSION {
                    let first = a.get_voxel(CHUNK_DIMENSION - 1, y, z);
                    let second = b.get_voxel(0, y, z);
                    if let Some((material, positive)) = required_face(first, second) {
                        expected.insert(UnitFace {
                            corner: [CHUNK_DIMENSION, y, z],
                            side: BlockSide::from_axis(0, positive),
                            material,
                        });
                    }
                }
            }
            assert_eq!(boundary, expected, "seed {seed}");
        }
    }

    #[test]
    fn every_generated_face_separates_a_visible_pair() {
        for seed in [3, 99] {
            let generator = TerrainGenerator::new(seed);
            let chunk = generated(&generator, ChunkCoord::new(-2, 5));
            let origin = chunk.origin();
            for unit in unit_faces(&chunk) {
                let axis = unit.side.axis();
                let mut low = [
                    unit.corner[0] - origin.x,
                    unit.corner[1] - origin.y,
                    unit.corner[2] - origin.z,
                ];
                let high = low;
                low[axis] -= 1;
                let (owner, other) = if unit.side.is_positive() {
                    (low, high)
                } else {
                    (high, low)
                };

                assert!(Chunk::is_interior(owner[0], owner[1], owner[2]), "{unit:?}");
                let owner = chunk.get_voxel(owner[0], owner[1], owner[2]);
                let other = chunk.get_voxel(other[0], other[1], other[2]);
                assert_eq!(owner, unit.material, "{unit:?}");
                assert!(owner.is_active(), "{unit:?}");
                assert!(
                    !other.is_active()
                        || (other != owner && (owner.is_transparent() || other.is_transparent())),
                    "seed {seed}: {unit:?} between {owner:?} and {other:?}"
                );
            }
        }
    }
}
