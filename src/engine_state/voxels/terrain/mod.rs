//! # Terrain Generation
//!
//! Deterministic, seed-driven procedural terrain. Every query is a pure function of
//! the seed and the world coordinate, so a column sampled while filling one chunk is
//! identical to the same column sampled while filling a neighbour's boundary shell.
//!
//! ## Pipeline per column
//!
//! 1. Sample climate: elevation, ridge, temperature and humidity noise
//! 2. Classify the biome and look up its parameters
//! 3. Shape the surface height with the biome's `Shaping`
//! 4. Fill bottom to top: bedrock, stone with depth-banded ores, subsurface, surface,
//!    then water up to `SEA_LEVEL`, carving caves below the surface
//!
//! Trees are placed afterwards per chunk (see `trees`).

use cgmath::Point3;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin, RidgedMulti};

use crate::engine_state::voxels::block::block_side::HORIZONTAL_SIDES;
use crate::engine_state::voxels::block::block_type::Material;
use crate::engine_state::voxels::chunk::{Chunk, CHUNK_DIMENSION, CHUNK_HEIGHT};

pub use biome::{Biome, BiomeParams, Shaping};

pub mod biome;
mod trees;

/// Highest cell that is filled with water when the terrain below it is lower.
pub const SEA_LEVEL: i32 = 40;

const BASE_HEIGHT: f64 = 46.0;
const HEIGHT_AMPLITUDE: f64 = 14.0;
const MIN_SURFACE_HEIGHT: i32 = 4;
const MAX_SURFACE_HEIGHT: i32 = CHUNK_HEIGHT - 16;

const CAVE_FREQUENCY: f64 = 0.045;
const CAVE_THRESHOLD: f64 = 0.5;
const DUNE_FREQUENCY: f64 = 0.06;

const ORE_FREQUENCY: f64 = 0.12;
/// Ores never appear this close to the surface.
const ORE_MIN_DEPTH: i32 = 5;

/// Depth bands for ores, rarest first: `(material, highest y, noise threshold)`.
const ORE_BANDS: [(Material, i32, f64); 4] = [
    (Material::DIAMOND_ORE, 16, 0.72),
    (Material::GOLD_ORE, 32, 0.64),
    (Material::IRON_ORE, 64, 0.56),
    (Material::COAL_ORE, CHUNK_HEIGHT, 0.48),
];

/// Raw climate samples for one column.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Climate {
    /// Large-scale elevation in `[-1, 1]`.
    pub elevation: f64,
    /// Ridge noise in `[0, 1]`, modulates peak height.
    pub ridge: f64,
    /// Temperature in `[0, 1]`.
    pub temperature: f64,
    /// Humidity in `[0, 1]`.
    pub humidity: f64,
}

/// One generated column of the world.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainColumn {
    /// Biome classified for this column
    pub biome: Biome,
    /// Number of cells from the bottom up to and including the surface cell.
    pub surface_height: i32,
    /// Materials from `y = 0` upwards.
    pub materials: [Material; CHUNK_HEIGHT as usize],
}

/// Seeded terrain generator shared by every generation and meshing task.
pub struct TerrainGenerator {
    seed: u32,
    elevation: Fbm<Perlin>,
    ridges: RidgedMulti<Perlin>,
    temperature: Fbm<Perlin>,
    humidity: Fbm<Perlin>,
    dunes: Fbm<Perlin>,
    caves: Fbm<Perlin>,
    ores: Perlin,
}

/// Maps a noise sample in roughly `[-1, 1]` onto `[0, 1]`.
fn unit(value: f64) -> f64 {
    (value * 0.5 + 0.5).clamp(0.0, 1.0)
}

impl TerrainGenerator {
    /// Creates a generator. The same seed always produces the same world.
    pub fn new(seed: u32) -> Self {
        TerrainGenerator {
            seed,
            elevation: Fbm::<Perlin>::new(seed)
                .set_octaves(5)
                .set_frequency(0.004),
            ridges: RidgedMulti::<Perlin>::new(seed ^ 0x5EED_0001)
                .set_octaves(4)
                .set_frequency(0.01),
            temperature: Fbm::<Perlin>::new(seed ^ 0x7E3F_0002)
                .set_octaves(2)
                .set_frequency(0.0015),
            humidity: Fbm::<Perlin>::new(seed ^ 0x4A1D_0003)
                .set_octaves(2)
                .set_frequency(0.0018),
            dunes: Fbm::<Perlin>::new(seed ^ 0xD0E5_0004)
                .set_octaves(2)
                .set_frequency(DUNE_FREQUENCY),
            caves: Fbm::<Perlin>::new(seed ^ 0xCA7E_0005)
                .set_octaves(3)
                .set_frequency(CAVE_FREQUENCY),
            ores: Perlin::new(seed ^ 0x0BE5_0006),
        }
    }

    /// The world seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Samples the climate fields for the column at world `(x, z)`.
    pub fn climate_at(&self, x: i32, z: i32) -> Climate {
        let point = [x as f64, z as f64];
        Climate {
            elevation: self.elevation.get(point).clamp(-1.0, 1.0),
            ridge: unit(self.ridges.get(point)),
            temperature: unit(self.temperature.get(point) * 1.5),
            humidity: unit(self.humidity.get(point) * 1.5),
        }
    }

    /// The biome of the column at world `(x, z)`.
    pub fn biome_at(&self, x: i32, z: i32) -> Biome {
        let climate = self.climate_at(x, z);
        Biome::classify(climate.elevation, climate.temperature, climate.humidity)
    }

    /// Surface height of a column, after biome shaping, clamped to the world.
    fn surface_height(&self, biome: Biome, climate: &Climate, x: i32, z: i32) -> i32 {
        let elevation = climate.elevation;
        let mut height = BASE_HEIGHT + elevation * HEIGHT_AMPLITUDE;

        match biome.params().shaping {
            Shaping::Peaks {
                threshold,
                exponent,
                amplitude,
            } => {
                if elevation > threshold {
                    let t = ((elevation - threshold) / (1.0 - threshold)).clamp(0.0, 1.0);
                    height += t.powf(exponent) * amplitude * (0.5 + 0.5 * climate.ridge);
                }
            }
            Shaping::Valleys { threshold, depth } => {
                if elevation < threshold {
                    height -= (threshold - elevation) * depth;
                }
            }
            Shaping::Flatten { factor } => {
                height = BASE_HEIGHT + elevation * HEIGHT_AMPLITUDE * factor;
            }
            Shaping::Dunes {
                amplitude,
                mesa_threshold,
                terrace,
            } => {
                let ripple = self.dunes.get([x as f64, z as f64]);
                height += (1.0 - ripple.abs()) * amplitude;
                if elevation > mesa_threshold {
                    height = (height / terrace).floor() * terrace + terrace;
                }
            }
        }

        (height.round() as i32).clamp(MIN_SURFACE_HEIGHT, MAX_SURFACE_HEIGHT)
    }

    fn is_cave(&self, x: i32, y: i32, z: i32) -> bool {
        self.caves.get([x as f64, y as f64, z as f64]) > CAVE_THRESHOLD
    }

    /// Stone or an ore, depending on depth band and ore noise.
    fn rock_at(&self, x: i32, y: i32, z: i32, depth: i32) -> Material {
        if depth < ORE_MIN_DEPTH {
            return Material::STONE;
        }
        let sample = self.ores.get([
            x as f64 * ORE_FREQUENCY,
            y as f64 * ORE_FREQUENCY,
            z as f64 * ORE_FREQUENCY,
        ]);
        ORE_BANDS
            .iter()
            .find(|(_, max_y, threshold)| y < *max_y && sample > *threshold)
            .map(|(ore, _, _)| *ore)
            .unwrap_or(Material::STONE)
    }

    /// Generates the full column at world `(x, z)`.
    pub fn generate_column(&self, x: i32, z: i32) -> TerrainColumn {
        let climate = self.climate_at(x, z);
        let biome = Biome::classify(climate.elevation, climate.temperature, climate.humidity);
        let params = biome.params();
        let surface_height = self.surface_height(biome, &climate, x, z);
        let submerged = surface_height <= SEA_LEVEL;

        let mut materials = [Material::AIR; CHUNK_HEIGHT as usize];
        for (y, slot) in materials.iter_mut().enumerate() {
            let y = y as i32;
            *slot = if y == 0 {
                Material::BEDROCK
            } else if y < surface_height {
                let depth = surface_height - 1 - y;
                // Keep lake and sea floors sealed.
                let sealed = submerged && depth < 3;
                if y > 1 && !sealed && self.is_cave(x, y, z) {
                    Material::AIR
                } else if depth == 0 {
                    if submerged {
                        params.underwater_surface
                    } else {
                        params.surface
                    }
                } else if depth <= params.subsurface_depth {
                    params.subsurface
                } else {
                    self.rock_at(x, y, z, depth)
                }
            } else if y <= SEA_LEVEL {
                Material::WATER
            } else {
                Material::AIR
            };
        }

        TerrainColumn {
            biome,
            surface_height,
            materials,
        }
    }

    /// Fills an empty chunk: terrain columns, trees, then the boundary shell sampled
    /// from the neighbouring columns.
    pub fn populate_chunk(&self, chunk: &mut Chunk) {
        let origin = chunk.origin();
        let mut columns = Vec::with_capacity((CHUNK_DIMENSION * CHUNK_DIMENSION) as usize);

        for local_z in 0..CHUNK_DIMENSION {
            for local_x in 0..CHUNK_DIMENSION {
                let column = self.generate_column(origin.x + local_x, origin.z + local_z);
                for (y, material) in column.materials.iter().enumerate() {
                    chunk.set_voxel(local_x, y as i32, local_z, *material);
                }
                columns.push(column);
            }
        }

        trees::plant_trees(self.seed, chunk, &columns);

        for side in HORIZONTAL_SIDES {
            for t in 0..CHUNK_DIMENSION {
                let cell: Point3<i32> = Chunk::shell_cell(side, t, 0);
                let column = self.generate_column(origin.x + cell.x, origin.z + cell.z);
                for (y, material) in column.materials.iter().enumerate() {
                    if material.is_active() {
                        chunk.set_voxel(cell.x, y as i32, cell.z, *material);
                    }
                }
            }
        }
    }
}
