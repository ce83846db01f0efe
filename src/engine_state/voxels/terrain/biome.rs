//! # Biome Module
//!
//! Categorical terrain styles and the parameter table that drives height shaping,
//! surface materials, vegetation and tinting for each of them.

use crate::engine_state::voxels::block::block_type::Material;

/// Elevation (in `[-1, 1]`) above which a column counts as mountainous.
pub const MOUNTAIN_ELEVATION: f64 = 0.35;
/// Temperature (in `[0, 1]`) below which mountains are snow-capped.
pub const SNOW_TEMPERATURE: f64 = 0.4;
/// Humidity below which hot columns become desert.
pub const DESERT_HUMIDITY: f64 = 0.35;
/// Temperature above which dry columns become desert.
pub const DESERT_TEMPERATURE: f64 = 0.6;
/// Humidity above which columns become forest.
pub const FOREST_HUMIDITY: f64 = 0.58;

/// Categorical terrain style of a column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Biome {
    /// Gentle grassland; the fallback biome.
    PLAINS = 0,
    /// Humid, tree-dense land with carved pools.
    FOREST = 1,
    /// Hot, dry dunes and mesas.
    DESERT = 2,
    /// High, sharpened rocky peaks.
    MOUNTAINS = 3,
    /// High and cold peaks with a snow cover.
    SNOWY_PEAKS = 4,
}

/// How a biome reshapes the base surface height.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shaping {
    /// Exponential sharpening once elevation passes `threshold`.
    Peaks {
        /// Elevation above which sharpening starts
        threshold: f64,
        /// Power applied to the excess elevation
        exponent: f64,
        /// Blocks added at full excess
        amplitude: f64,
    },
    /// Depth carving once elevation drops under `threshold`, producing valleys and pools.
    Valleys {
        /// Elevation below which carving starts
        threshold: f64,
        /// Blocks removed at full depth
        depth: f64,
    },
    /// Scales the noise-driven offset down by `factor`.
    Flatten {
        /// Multiplier on the offset, in `[0, 1]`
        factor: f64,
    },
    /// Rolling dunes, terraced into mesas above `mesa_threshold`.
    Dunes {
        /// Height of the dune ripple in blocks
        amplitude: f64,
        /// Elevation above which the surface is terraced
        mesa_threshold: f64,
        /// Step height of the terraces
        terrace: f64,
    },
}

/// Per-biome generation and shading parameters.
#[derive(Debug)]
pub struct BiomeParams {
    /// Top cell of a dry column.
    pub surface: Material,
    /// Cells just under the surface.
    pub subsurface: Material,
    /// How many cells of `subsurface` sit under the surface cell.
    pub subsurface_depth: i32,
    /// Top cell of a column that ends under sea level.
    pub underwater_surface: Material,
    /// Probability that a suitable column grows a tree.
    pub tree_chance: f32,
    /// Inclusive trunk height range.
    pub trunk_height: (i32, i32),
    /// Horizontal canopy radius.
    pub canopy_radius: i32,
    /// Height shaping applied on top of the base elevation.
    pub shaping: Shaping,
    /// Tint of grass tops.
    pub grass_tint: [f32; 3],
    /// Tint of leaves.
    pub foliage_tint: [f32; 3],
    /// Tint of water.
    pub water_tint: [f32; 3],
}

/// Parameter table indexed by `Biome as usize`.
static BIOME_PARAMS: [BiomeParams; 5] = [
    // PLAINS
    BiomeParams {
        surface: Material::GRASS,
        subsurface: Material::DIRT,
        subsurface_depth: 3,
        underwater_surface: Material::SAND,
        tree_chance: 0.004,
        trunk_height: (4, 5),
        canopy_radius: 2,
        shaping: Shaping::Flatten { factor: 0.6 },
        grass_tint: [0.55, 0.80, 0.35],
        foliage_tint: [0.45, 0.70, 0.30],
        water_tint: [0.25, 0.45, 0.85],
    },
    // FOREST
    BiomeParams {
        surface: Material::GRASS,
        subsurface: Material::DIRT,
        subsurface_depth: 4,
        underwater_surface: Material::DIRT,
        tree_chance: 0.035,
        trunk_height: (5, 7),
        canopy_radius: 2,
        shaping: Shaping::Valleys {
            threshold: -0.1,
            depth: 18.0,
        },
        grass_tint: [0.35, 0.65, 0.25],
        foliage_tint: [0.25, 0.55, 0.20],
        water_tint: [0.20, 0.40, 0.60],
    },
    // DESERT
    BiomeParams {
        surface: Material::SAND,
        subsurface: Material::SANDSTONE,
        subsurface_depth: 4,
        underwater_surface: Material::SAND,
        tree_chance: 0.0,
        trunk_height: (0, 0),
        canopy_radius: 0,
        shaping: Shaping::Dunes {
            amplitude: 4.0,
            mesa_threshold: 0.2,
            terrace: 4.0,
        },
        grass_tint: [0.75, 0.70, 0.40],
        foliage_tint: [0.65, 0.65, 0.35],
        water_tint: [0.30, 0.60, 0.75],
    },
    // MOUNTAINS
    BiomeParams {
        surface: Material::STONE,
        subsurface: Material::STONE,
        subsurface_depth: 1,
        underwater_surface: Material::GRAVEL,
        tree_chance: 0.006,
        trunk_height: (4, 6),
        canopy_radius: 1,
        shaping: Shaping::Peaks {
            threshold: MOUNTAIN_ELEVATION,
            exponent: 1.8,
            amplitude: 48.0,
        },
        grass_tint: [0.50, 0.65, 0.40],
        foliage_tint: [0.35, 0.50, 0.30],
        water_tint: [0.25, 0.45, 0.70],
    },
    // SNOWY_PEAKS
    BiomeParams {
        surface: Material::SNOW,
        subsurface: Material::DIRT,
        subsurface_depth: 2,
        underwater_surface: Material::GRAVEL,
        tree_chance: 0.003,
        trunk_height: (5, 6),
        canopy_radius: 1,
        shaping: Shaping::Peaks {
            threshold: MOUNTAIN_ELEVATION,
            exponent: 2.2,
            amplitude: 56.0,
        },
        grass_tint: [0.60, 0.70, 0.60],
        foliage_tint: [0.40, 0.55, 0.45],
        water_tint: [0.35, 0.50, 0.80],
    },
];

impl Biome {
    /// Classifies a column from its elevation (`[-1, 1]`), temperature and humidity
    /// (both `[0, 1]`).
    pub fn classify(elevation: f64, temperature: f64, humidity: f64) -> Self {
        if elevation > MOUNTAIN_ELEVATION {
            if temperature < SNOW_TEMPERATURE {
                Biome::SNOWY_PEAKS
            } else {
                Biome::MOUNTAINS
            }
        } else if humidity < DESERT_HUMIDITY && temperature > DESERT_TEMPERATURE {
            Biome::DESERT
        } else if humidity > FOREST_HUMIDITY {
            Biome::FOREST
        } else {
            Biome::PLAINS
        }
    }

    /// The generation parameters for this biome.
    pub fn params(self) -> &'static BiomeParams {
        &BIOME_PARAMS[self as usize]
    }

    /// The base tint this biome applies to `material`, or white for untinted materials.
    pub fn tint(self, material: Material) -> [f32; 3] {
        let params = self.params();
        match material {
            Material::GRASS => params.grass_tint,
            Material::LEAVES => params.foliage_tint,
            Material::WATER => params.water_tint,
            _ => [1.0, 1.0, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_follows_thresholds() {
        assert_eq!(Biome::classify(0.8, 0.2, 0.5), Biome::SNOWY_PEAKS);
        assert_eq!(Biome::classify(0.8, 0.7, 0.5), Biome::MOUNTAINS);
        assert_eq!(Biome::classify(0.0, 0.8, 0.1), Biome::DESERT);
        assert_eq!(Biome::classify(0.0, 0.5, 0.9), Biome::FOREST);
        assert_eq!(Biome::classify(0.0, 0.5, 0.5), Biome::PLAINS);
    }

    #[test]
    fn table_rows_match_their_biomes() {
        assert_eq!(Biome::DESERT.params().surface, Material::SAND);
        assert_eq!(Biome::SNOWY_PEAKS.params().surface, Material::SNOW);
        assert!(matches!(Biome::FOREST.params().shaping, Shaping::Valleys { .. }));
        assert_eq!(Biome::PLAINS.tint(Material::STONE), [1.0, 1.0, 1.0]);
    }
}
