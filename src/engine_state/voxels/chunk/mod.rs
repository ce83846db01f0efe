//! # Chunk Module
//!
//! This module provides the `Chunk` struct: one horizontal partition of the voxel
//! world, `CHUNK_DIMENSION` blocks wide and deep and `CHUNK_HEIGHT` blocks tall.
//!
//! ## Storage
//!
//! A chunk owns three pieces of data:
//! - `blocks`: a dense grid of material ids indexed by `x + S * (z + S * y)`
//! - a sparse boundary shell holding the materials that the four horizontally
//!   adjacent chunks store one cell beyond this chunk's grid (see `boundary`)
//! - the derived surface mesh, once it has been built
//!
//! Lookups outside the grid and the shell resolve to `Material::AIR`, since the
//! mesher routinely reads one cell past the chunk's edges.
//!
//! ## Lifecycle
//!
//! `UNLOADED` on creation, `GENERATED` once the terrain generator has filled it,
//! `MESHED` once a mesh has been built. Any edit sends it back to `GENERATED`.

use std::collections::HashMap;
use std::sync::Arc;

use cgmath::{Point2, Point3};

use crate::engine_state::rendering::meshing::Mesh;
use crate::engine_state::voxels::block::block_side::BlockSide;
use crate::engine_state::voxels::block::block_type::Material;
use crate::engine_state::voxels::block::BlockTypeSize;
use crate::engine_state::voxels::terrain::TerrainGenerator;

pub mod boundary;

/// The horizontal dimension (width and depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The fixed height of every chunk, which is also the height of the world.
pub const CHUNK_HEIGHT: i32 = 128;
/// The number of blocks in a single horizontal layer of a chunk.
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk.
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_HEIGHT;

/// Integer partition coordinate of a chunk on the horizontal plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// Partition index along world X.
    pub x: i32,
    /// Partition index along world Z.
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a coordinate from its two partition indices.
    pub const fn new(x: i32, z: i32) -> Self {
        ChunkCoord { x, z }
    }

    /// The chunk owning the block containing `position`.
    pub fn from_world(position: Point3<f32>) -> Self {
        ChunkCoord {
            x: (position.x / CHUNK_DIMENSION as f32).floor() as i32,
            z: (position.z / CHUNK_DIMENSION as f32).floor() as i32,
        }
    }

    /// World-space block coordinate of this chunk's `(0, 0, 0)` cell.
    pub fn origin(self) -> Point3<i32> {
        Point3::new(self.x * CHUNK_DIMENSION, 0, self.z * CHUNK_DIMENSION)
    }

    /// The chunk on the other side of `side`. Vertical sides return `self`.
    pub fn neighbor(self, side: BlockSide) -> Self {
        let (dx, dz) = side_offset(side);
        ChunkCoord::new(self.x + dx, self.z + dz)
    }

    /// Distance in chunks from this chunk's centre to a viewer position expressed in
    /// (fractional) chunk units.
    pub fn distance_to(self, viewer_chunk_position: Point2<f32>) -> f32 {
        let dx = self.x as f32 + 0.5 - viewer_chunk_position.x;
        let dz = self.z as f32 + 0.5 - viewer_chunk_position.y;
        (dx * dx + dz * dz).sqrt()
    }
}

/// Chunk-coordinate offset of the neighbour across a horizontal side.
pub(crate) fn side_offset(side: BlockSide) -> (i32, i32) {
    match side {
        BlockSide::LEFT => (-1, 0),
        BlockSide::RIGHT => (1, 0),
        BlockSide::BACK => (0, -1),
        BlockSide::FRONT => (0, 1),
        BlockSide::TOP | BlockSide::BOTTOM => (0, 0),
    }
}

/// Lifecycle state of a chunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChunkState {
    /// Created, but no voxel data yet.
    UNLOADED,
    /// Voxels populated; the mesh is missing or stale.
    GENERATED,
    /// Mesh is up to date with the voxel grid and shell.
    MESHED,
}

/// One horizontal partition of the voxel world.
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub position: ChunkCoord,

    /// Dense voxel grid of material ids, `CHUNK_SIZE` entries indexed by
    /// `x + S * (z + S * y)`.
    blocks: Vec<BlockTypeSize>,

    /// Neighbour-owned materials one cell beyond the grid. Air is never stored.
    shell: HashMap<Point3<i32>, Material>,

    /// The last mesh built for this chunk.
    mesh: Option<Arc<Mesh>>,

    state: ChunkState,
}

impl Chunk {
    /// Creates a new, empty chunk in the `UNLOADED` state.
    pub fn new(position: ChunkCoord) -> Self {
        Chunk {
            position,
            blocks: vec![Material::AIR.id(); CHUNK_SIZE as usize],
            shell: HashMap::new(),
            mesh: None,
            state: ChunkState::UNLOADED,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ChunkState {
        self.state
    }

    /// The last mesh built for this chunk, if any. May be stale unless the state is `MESHED`.
    pub fn mesh(&self) -> Option<&Arc<Mesh>> {
        self.mesh.as_ref()
    }

    /// World-space block coordinate of the chunk's `(0, 0, 0)` cell.
    pub fn origin(&self) -> Point3<i32> {
        self.position.origin()
    }

    /// Index of an interior cell in the dense grid.
    #[inline]
    pub fn index(x: i32, y: i32, z: i32) -> usize {
        (x + CHUNK_DIMENSION * (z + CHUNK_DIMENSION * y)) as usize
    }

    /// Whether `(x, y, z)` lies inside the dense grid.
    #[inline]
    pub fn is_interior(x: i32, y: i32, z: i32) -> bool {
        (0..CHUNK_DIMENSION).contains(&x)
            && (0..CHUNK_HEIGHT).contains(&y)
            && (0..CHUNK_DIMENSION).contains(&z)
    }

    /// Whether `(x, y, z)` is a face-adjacent overscan cell backed by the shell.
    ///
    /// Exactly one of `x` and `z` may be out of range, and only by one cell. The four
    /// vertical corner columns are never part of the shell.
    pub fn is_shell_coordinate(x: i32, y: i32, z: i32) -> bool {
        if !(0..CHUNK_HEIGHT).contains(&y) {
            return false;
        }
        let x_inside = (0..CHUNK_DIMENSION).contains(&x);
        let z_inside = (0..CHUNK_DIMENSION).contains(&z);
        let x_overscan = x == -1 || x == CHUNK_DIMENSION;
        let z_overscan = z == -1 || z == CHUNK_DIMENSION;
        (x_overscan && z_inside) || (z_overscan && x_inside)
    }

    /// Writes a material into the grid or the shell.
    ///
    /// Returns `false` without writing when the coordinate is neither interior nor a
    /// shell cell.
    pub fn set_voxel(&mut self, x: i32, y: i32, z: i32, material: Material) -> bool {
        if Self::is_interior(x, y, z) {
            self.blocks[Self::index(x, y, z)] = material.id();
            true
        } else if Self::is_shell_coordinate(x, y, z) {
            let key = Point3::new(x, y, z);
            if material.is_active() {
                self.shell.insert(key, material);
            } else {
                self.shell.remove(&key);
            }
            true
        } else {
            false
        }
    }

    /// Reads a material from the grid or the shell. Anything else is air.
    #[inline]
    pub fn get_voxel(&self, x: i32, y: i32, z: i32) -> Material {
        if Self::is_interior(x, y, z) {
            Material::from_id(self.blocks[Self::index(x, y, z)])
        } else if Self::is_shell_coordinate(x, y, z) {
            self.shell
                .get(&Point3::new(x, y, z))
                .copied()
                .unwrap_or(Material::AIR)
        } else {
            Material::AIR
        }
    }

    /// Whether the cell at `(x, y, z)` holds anything other than air.
    #[inline]
    pub fn is_voxel_active(&self, x: i32, y: i32, z: i32) -> bool {
        self.get_voxel(x, y, z).is_active()
    }

    /// Converts a world position into this chunk's local block coordinates.
    pub fn world_to_local(&self, world_position: Point3<f32>) -> Point3<i32> {
        let origin = self.origin();
        Point3::new(
            world_position.x.floor() as i32 - origin.x,
            world_position.y.floor() as i32 - origin.y,
            world_position.z.floor() as i32 - origin.z,
        )
    }

    /// Places `material` at a world position.
    ///
    /// Fails when the position lies outside this chunk's grid, when the target cell is
    /// already occupied, when `material` is air, or when the chunk has not been
    /// generated yet. On success the mesh becomes stale.
    pub fn place_voxel(&mut self, world_position: Point3<f32>, material: Material) -> bool {
        let local = self.world_to_local(world_position);
        if !material.is_active()
            || !self.can_edit(local)
            || self.is_voxel_active(local.x, local.y, local.z)
        {
            return false;
        }
        self.set_voxel(local.x, local.y, local.z, material);
        self.state = ChunkState::GENERATED;
        true
    }

    /// Clears the cell at a world position.
    ///
    /// Fails when the position lies outside this chunk's grid, when the cell is already
    /// empty, or when the chunk has not been generated yet. On success the mesh
    /// becomes stale.
    pub fn delete_voxel(&mut self, world_position: Point3<f32>) -> bool {
        let local = self.world_to_local(world_position);
        if !self.can_edit(local) || !self.is_voxel_active(local.x, local.y, local.z) {
            return false;
        }
        self.set_voxel(local.x, local.y, local.z, Material::AIR);
        self.state = ChunkState::GENERATED;
        true
    }

    fn can_edit(&self, local: Point3<i32>) -> bool {
        self.state != ChunkState::UNLOADED && Self::is_interior(local.x, local.y, local.z)
    }

    /// Marks the mesh stale. Has no effect on chunks that were never generated.
    pub fn invalidate_mesh(&mut self) {
        if self.state == ChunkState::MESHED {
            self.state = ChunkState::GENERATED;
        }
    }

    /// Fills the voxel grid and boundary shell from the terrain generator.
    pub fn generate(&mut self, generator: &TerrainGenerator) {
        self.blocks.fill(Material::AIR.id());
        self.shell.clear();
        generator.populate_chunk(self);
        self.state = ChunkState::GENERATED;
    }

    /// Rebuilds the surface mesh from the grid and shell.
    pub fn build_mesh(&mut self, generator: &TerrainGenerator) {
        let mesh = Mesh::greedy(self, generator);
        self.mesh = Some(Arc::new(mesh));
        self.state = ChunkState::MESHED;
    }

    /// Iterates over the occupied shell cells.
    pub fn shell_cells(&self) -> impl Iterator<Item = (Point3<i32>, Material)> + '_ {
        self.shell.iter().map(|(position, material)| (*position, *material))
    }

    /// Raw access to the interior grid, ordered by `Chunk::index`.
    pub fn blocks(&self) -> &[BlockTypeSize] {
        &self.blocks
    }

    #[cfg(test)]
    pub(crate) fn force_state(&mut self, state: ChunkState) {
        self.state = state;
    }
}
