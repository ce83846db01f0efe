//! # Block Type Module
//!
//! This module defines the materials a voxel can hold. A voxel is nothing more than
//! one of these identifiers stored in a chunk's grid; `AIR` is the empty sentinel.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates every material a voxel can hold.
///
/// The discriminants are the compact on-grid encoding. The `FromPrimitive` derive
/// allows decoding them back from a raw `BlockTypeSize`.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive)]
pub enum Material {
    /// Empty space. Also returned for any lookup outside a chunk's known extent.
    #[default]
    AIR = 0,
    /// Indestructible world floor.
    BEDROCK,
    /// Generic rock.
    STONE,
    /// Subsurface soil.
    DIRT,
    /// Soil with a grass top. Tinted by biome.
    GRASS,
    /// Beach and desert surface.
    SAND,
    /// Compacted desert subsurface.
    SANDSTONE,
    /// Cold surface cover.
    SNOW,
    /// Loose rock used for submerged mountain floors.
    GRAVEL,
    /// Liquid. Transparent and tinted.
    WATER,
    /// Tree trunk.
    WOOD,
    /// Tree canopy. Transparent and tinted.
    LEAVES,
    /// Shallow, common ore.
    COAL_ORE,
    /// Mid-depth ore.
    IRON_ORE,
    /// Deep ore.
    GOLD_ORE,
    /// Deepest, rarest ore.
    DIAMOND_ORE,
}

impl Material {
    /// Decodes a material from its grid encoding, falling back to `AIR` for unknown ids.
    pub fn from_id(id: BlockTypeSize) -> Self {
        Material::from_u8(id).unwrap_or(Material::AIR)
    }

    /// The compact grid encoding of this material.
    pub fn id(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Whether this cell counts as occupied.
    #[inline]
    pub fn is_active(self) -> bool {
        self != Material::AIR
    }

    /// Whether faces behind this material can be seen through it.
    #[inline]
    pub fn is_transparent(self) -> bool {
        matches!(self, Material::WATER | Material::LEAVES)
    }

    /// Whether quads of this material carry a biome tint.
    #[inline]
    pub fn needs_tint(self) -> bool {
        matches!(self, Material::GRASS | Material::LEAVES | Material::WATER)
    }

    /// Priority used to decide which of two different, touching materials owns the
    /// face between them. Opaque materials always win.
    pub fn render_priority(self) -> u8 {
        match self {
            Material::AIR => 0,
            Material::WATER => 1,
            Material::LEAVES => 2,
            _ => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_and_unknown_ids_are_air() {
        assert_eq!(Material::from_id(Material::LEAVES.id()), Material::LEAVES);
        assert_eq!(Material::from_id(200), Material::AIR);
    }

    #[test]
    fn opaque_materials_outrank_transparent_ones() {
        assert!(Material::STONE.render_priority() > Material::LEAVES.render_priority());
        assert!(Material::LEAVES.render_priority() > Material::WATER.render_priority());
        assert!(!Material::AIR.is_active());
        assert!(Material::WATER.is_transparent() && Material::WATER.needs_tint());
    }
}
