//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel engine.
//! It includes material definitions, block face handling, and the texture table
//! the mesher uses to pick a sub-texture per face.

use block_side::BlockSide;
use block_type::Material;
use phf::phf_map;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent materials in a chunk grid.
pub type BlockTypeSize = u8;

/// Maps each material id to its texture indices as `[top, side, bottom]`.
///
/// Materials such as grass show a different sub-texture on top than on their sides.
static MATERIAL_TO_TEXTURE_INDICES: phf::Map<u8, [u32; 3]> = phf_map! {
    1u8 => [0, 0, 0],    // BEDROCK
    2u8 => [1, 1, 1],    // STONE
    3u8 => [2, 2, 2],    // DIRT
    4u8 => [3, 4, 2],    // GRASS (top: 3, sides: 4, bottom: dirt)
    5u8 => [5, 5, 5],    // SAND
    6u8 => [6, 7, 6],    // SANDSTONE
    7u8 => [8, 9, 2],    // SNOW (top: 8, sides: 9, bottom: dirt)
    8u8 => [10, 10, 10], // GRAVEL
    9u8 => [11, 11, 11], // WATER
    10u8 => [12, 13, 12], // WOOD (rings on top and bottom, bark on sides)
    11u8 => [14, 14, 14], // LEAVES
    12u8 => [15, 15, 15], // COAL_ORE
    13u8 => [16, 16, 16], // IRON_ORE
    14u8 => [17, 17, 17], // GOLD_ORE
    15u8 => [18, 18, 18], // DIAMOND_ORE
};

/// Looks up the texture index a material shows on the given face.
///
/// Unknown materials fall back to texture 0.
pub fn texture_index_for(material: Material, side: BlockSide) -> u32 {
    let Some(indices) = MATERIAL_TO_TEXTURE_INDICES.get(&material.id()) else {
        return 0;
    };
    match side {
        BlockSide::TOP => indices[0],
        BlockSide::BOTTOM => indices[2],
        _ => indices[1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grass_top_differs_from_its_sides() {
        let top = texture_index_for(Material::GRASS, BlockSide::TOP);
        let side = texture_index_for(Material::GRASS, BlockSide::RIGHT);
        let bottom = texture_index_for(Material::GRASS, BlockSide::BOTTOM);
        assert_ne!(top, side);
        assert_eq!(bottom, texture_index_for(Material::DIRT, BlockSide::TOP));
    }

    #[test]
    fn every_solid_material_has_textures() {
        for id in 1..=Material::DIAMOND_ORE.id() {
            assert!(MATERIAL_TO_TEXTURE_INDICES.contains_key(&id), "missing {id}");
        }
    }
}
