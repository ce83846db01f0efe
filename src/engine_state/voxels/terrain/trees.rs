//! Tree placement. Each column draws from its own RNG seeded by the world seed and
//! the column coordinate, so the result does not depend on generation order.

use fastrand::Rng;

use crate::engine_state::voxels::block::block_type::Material;
use crate::engine_state::voxels::chunk::{Chunk, CHUNK_DIMENSION, CHUNK_HEIGHT};

use super::{TerrainColumn, SEA_LEVEL};

/// Mixes the world seed with a column coordinate into an RNG seed.
fn column_seed(seed: u32, x: i32, z: i32) -> u64 {
    let mut hash = (seed as u64) ^ 0x9E37_79B9_7F4A_7C15;
    hash ^= (x as i64 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    hash = hash.rotate_left(31);
    hash ^= (z as i64 as u64).wrapping_mul(0x1656_67B1_9E37_79F9);
    hash ^ (hash >> 29)
}

/// Plants trees on the generated columns of `chunk`.
///
/// `columns` is ordered `x + S * z`. Trees are skipped when their canopy would reach
/// the outermost ring of the chunk, so the edge columns stay identical to what the
/// neighbours sample into their shells.
pub(super) fn plant_trees(seed: u32, chunk: &mut Chunk, columns: &[TerrainColumn]) {
    let origin = chunk.origin();

    for local_z in 0..CHUNK_DIMENSION {
        for local_x in 0..CHUNK_DIMENSION {
            let column = &columns[(local_x + CHUNK_DIMENSION * local_z) as usize];
            let params = column.biome.params();
            if params.tree_chance <= 0.0 {
                continue;
            }

            let margin = params.canopy_radius + 1;
            if local_x < margin
                || local_z < margin
                || local_x >= CHUNK_DIMENSION - margin
                || local_z >= CHUNK_DIMENSION - margin
            {
                continue;
            }

            let mut rng = Rng::with_seed(column_seed(seed, origin.x + local_x, origin.z + local_z));
            if rng.f32() >= params.tree_chance {
                continue;
            }

            let ground = column.surface_height - 1;
            if ground < SEA_LEVEL {
                continue;
            }
            let soil = chunk.get_voxel(local_x, ground, local_z);
            if !matches!(soil, Material::GRASS | Material::DIRT | Material::SNOW) {
                continue;
            }

            let (min_trunk, max_trunk) = params.trunk_height;
            let trunk = rng.i32(min_trunk..=max_trunk);
            let radius = params.canopy_radius;
            if ground + trunk + radius + 1 >= CHUNK_HEIGHT {
                continue;
            }

            grow_tree(chunk, &mut rng, (local_x, ground, local_z), trunk, radius);
        }
    }
}

/// Writes a trunk and an ellipsoid canopy above `base`. Only air cells are replaced.
fn grow_tree(chunk: &mut Chunk, rng: &mut Rng, base: (i32, i32, i32), trunk: i32, radius: i32) {
    let (x, ground, z) = base;
    for y in ground + 1..=ground + trunk {
        fill_if_air(chunk, x, y, z, Material::WOOD);
    }

    let top = ground + trunk;
    let horizontal = radius as f32 + 0.5;
    let vertical = radius as f32 * 0.75 + 0.75;
    for dy in -radius..=radius + 1 {
        for dz in -radius..=radius {
            for dx in -radius..=radius {
                let distance = (dx * dx + dz * dz) as f32 / (horizontal * horizontal)
                    + (dy * dy) as f32 / (vertical * vertical);
                if distance > 1.0 {
                    continue;
                }
                // Ragged outer layer.
                if distance > 0.7 && rng.f32() < 0.2 {
                    continue;
                }
                fill_if_air(chunk, x + dx, top + dy, z + dz, Material::LEAVES);
            }
        }
    }
}

fn fill_if_air(chunk: &mut Chunk, x: i32, y: i32, z: i32, material: Material) {
    if Chunk::is_interior(x, y, z) && !chunk.is_voxel_active(x, y, z) {
        chunk.set_voxel(x, y, z, material);
    }
}
