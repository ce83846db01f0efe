//! Mesh data structures and operations for voxel rendering.
//!
//! This module turns the merged faces produced by the greedy mesher into indexed
//! triangle lists. Identical vertices are shared through a small cache keyed by the
//! vertex's raw bytes.

use std::collections::HashMap;

use log::debug;
use web_time::Instant;

use crate::engine_state::rendering::Vertex;
use crate::engine_state::voxels::{
    block::{block_type::Material, texture_index_for},
    chunk::Chunk,
    terrain::TerrainGenerator,
};

use super::{face::Face, greedy};

/// Largest per-channel deviation applied to biome tints.
const TINT_JITTER: f32 = 0.04;

/// An indexed triangle mesh of one chunk, in world space.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    quad_count: usize,
}

impl Mesh {
    /// Creates a new, empty mesh.
    pub fn new() -> Self {
        Mesh::default()
    }

    /// Builds the mesh of a chunk with the greedy mesher.
    ///
    /// # Arguments
    /// * `chunk` - The chunk to mesh, including its boundary shell
    /// * `generator` - Used to look up the biome tint of grass, leaves and water
    ///
    /// # Returns
    /// A mesh whose vertices are in world space.
    pub fn greedy(chunk: &Chunk, generator: &TerrainGenerator) -> Self {
        let start = Instant::now();
        let origin = chunk.origin();
        let faces = greedy::greedy_faces(chunk);

        let mut mesh = Mesh::new();
        let mut cache = HashMap::new();
        for face in &faces {
            let source = face.source_cell();
            let source_x = origin.x + source.x;
            let source_z = origin.z + source.z;
            let tint = tint_for(generator, face.material, source_x, source_z);
            mesh.push_face(face, origin, tint, &mut cache);
        }

        debug!(
            "Meshed chunk ({}, {}): {} quads, {} vertices in {:?}",
            chunk.position.x,
            chunk.position.z,
            mesh.quad_count,
            mesh.vertices.len(),
            start.elapsed()
        );
        mesh
    }

    /// Appends one face as two triangles, sharing identical vertices.
    fn push_face(
        &mut self,
        face: &Face,
        origin: cgmath::Point3<i32>,
        tint: [f32; 3],
        cache: &mut HashMap<[u32; 12], u32>,
    ) {
        let normal = face.block_side.normal();
        let texture_index = texture_index_for(face.material, face.block_side);

        let mut corner_indices = [0u32; 4];
        for (slot, (corner, a, b)) in corner_indices.iter_mut().zip(face.corners()) {
            let position = cgmath::Point3::new(
                origin.x + corner.x,
                origin.y + corner.y,
                origin.z + corner.z,
            );
            let vertex = Vertex::new(position, normal, face.tex_coords(a, b), texture_index, tint);
            *slot = *cache.entry(vertex.as_key()).or_insert_with(|| {
                self.vertices.push(vertex);
                (self.vertices.len() - 1) as u32
            });
        }

        let [i0, i1, i2, i3] = corner_indices;
        self.indices.extend_from_slice(&[i0, i1, i2, i0, i2, i3]);
        self.quad_count += 1;
    }

    /// Vertex buffer contents.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Triangle list, three indices per triangle.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of merged rectangles in the mesh.
    pub fn quad_count(&self) -> usize {
        self.quad_count
    }

    /// Whether the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Tint for a face of `material` whose source column is world `(x, z)`.
///
/// Tinted materials take their biome colour, offset by a small deterministic jitter
/// per column. Everything else is white.
fn tint_for(generator: &TerrainGenerator, material: Material, x: i32, z: i32) -> [f32; 3] {
    if !material.needs_tint() {
        return [1.0, 1.0, 1.0];
    }
    let base = generator.biome_at(x, z).tint(material);
    let jitter = column_jitter(x, z);
    base.map(|channel| (channel + jitter).clamp(0.0, 1.0))
}

/// Deterministic value in `[-TINT_JITTER, TINT_JITTER]` for a column.
fn column_jitter(x: i32, z: i32) -> f32 {
    let mut hash = (x as u32).wrapping_mul(0x27D4_EB2D) ^ (z as u32).wrapping_mul(0x1656_67B1);
    hash ^= hash >> 15;
    hash = hash.wrapping_mul(0x85EB_CA6B);
    hash ^= hash >> 13;
    let unit = (hash & 0xFFFF) as f32 / 65535.0;
    (unit * 2.0 - 1.0) * TINT_JITTER
}
