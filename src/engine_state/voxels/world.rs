//! # World Module
//!
//! This module provides the `ChunkTable`, the single owner of every resident chunk.
//!
//! ## Architecture
//!
//! The table holds one `ChunkSlot` per resident chunk coordinate, a FIFO queue of
//! coordinates waiting to be instantiated, and the in-flight set: coordinates whose
//! chunk is currently checked out by a background task.
//!
//! ## Ownership
//!
//! Handing a chunk to a task moves it out of its slot (`check_out`); the task hands
//! it back when it completes (`check_in`). While a chunk is out, its slot remains
//! so that the coordinate still counts as resident, but nothing on the main thread
//! can read or edit it. A chunk is therefore only ever touched by one thread.
//!
//! ## Boundary consistency
//!
//! On check-in, shells are synchronised in both directions with every resident,
//! generated neighbour, and edits write through to resident neighbours' shells. Any
//! neighbour whose shell changed has its mesh invalidated.

use std::collections::{HashMap, HashSet, VecDeque};

use cgmath::{Point2, Point3};
use log::debug;

use crate::engine_state::voxels::block::block_side::HORIZONTAL_SIDES;
use crate::engine_state::voxels::block::block_type::Material;
use crate::engine_state::voxels::chunk::{
    side_offset, Chunk, ChunkCoord, ChunkState, CHUNK_DIMENSION,
};

/// Table entry for one resident chunk coordinate.
pub struct ChunkSlot {
    /// `None` while the chunk is checked out by a task.
    chunk: Option<Box<Chunk>>,
    /// Whether the chunk intersected the view frustum in the last frame.
    pub visible: bool,
    /// State at check-out, reported while the chunk is away.
    last_state: ChunkState,
}

impl ChunkSlot {
    fn new(coord: ChunkCoord) -> Self {
        ChunkSlot {
            chunk: Some(Box::new(Chunk::new(coord))),
            visible: false,
            last_state: ChunkState::UNLOADED,
        }
    }

    /// The chunk's state, or its state at check-out if it is away.
    pub fn state(&self) -> ChunkState {
        self.chunk
            .as_ref()
            .map_or(self.last_state, |chunk| chunk.state())
    }

    /// The chunk, unless it is checked out.
    pub fn chunk(&self) -> Option<&Chunk> {
        self.chunk.as_deref()
    }

    /// Whether a task currently holds the chunk.
    pub fn is_checked_out(&self) -> bool {
        self.chunk.is_none()
    }
}

/// All resident chunks plus the load queue and the in-flight set.
#[derive(Default)]
pub struct ChunkTable {
    slots: HashMap<ChunkCoord, ChunkSlot>,
    load_queue: VecDeque<ChunkCoord>,
    queued: HashSet<ChunkCoord>,
    in_flight: HashSet<ChunkCoord>,
}

impl ChunkTable {
    /// Creates a new, empty table.
    pub fn new() -> Self {
        ChunkTable::default()
    }

    /// Number of resident chunks, including checked-out ones.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no chunk is resident.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether `coord` has a slot, checked out or not.
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.slots.contains_key(&coord)
    }

    /// The slot of a resident chunk.
    pub fn slot(&self, coord: ChunkCoord) -> Option<&ChunkSlot> {
        self.slots.get(&coord)
    }

    /// Every resident coordinate with its slot, in no particular order.
    pub fn slots(&self) -> impl Iterator<Item = (ChunkCoord, &ChunkSlot)> + '_ {
        self.slots.iter().map(|(coord, slot)| (*coord, slot))
    }

    pub(crate) fn slots_mut(&mut self) -> impl Iterator<Item = (ChunkCoord, &mut ChunkSlot)> + '_ {
        self.slots.iter_mut().map(|(coord, slot)| (*coord, slot))
    }

    /// Coordinates currently checked out by tasks.
    pub fn in_flight(&self) -> &HashSet<ChunkCoord> {
        &self.in_flight
    }

    /// Whether a task currently holds the chunk at `coord`.
    pub fn is_in_flight(&self, coord: ChunkCoord) -> bool {
        self.in_flight.contains(&coord)
    }

    /// Number of coordinates waiting to be instantiated.
    pub fn queued_len(&self) -> usize {
        self.load_queue.len()
    }

    /// Queues a coordinate for instantiation unless it is resident or already queued.
    pub fn enqueue(&mut self, coord: ChunkCoord) -> bool {
        if self.slots.contains_key(&coord) || !self.queued.insert(coord) {
            return false;
        }
        self.load_queue.push_back(coord);
        true
    }

    /// Instantiates up to `max` queued coordinates as empty `UNLOADED` chunks.
    ///
    /// # Returns
    /// The coordinates that were instantiated, in queue order.
    pub fn drain_queue(&mut self, max: usize) -> Vec<ChunkCoord> {
        let mut created = Vec::with_capacity(max.min(self.load_queue.len()));
        while created.len() < max {
            let Some(coord) = self.load_queue.pop_front() else {
                break;
            };
            self.queued.remove(&coord);
            if self.slots.contains_key(&coord) {
                continue;
            }
            self.slots.insert(coord, ChunkSlot::new(coord));
            created.push(coord);
        }
        created
    }

    /// Unloads every chunk farther than `radius` chunks from `viewer`, except those
    /// in flight, and forgets queued coordinates that far out.
    ///
    /// # Returns
    /// The number of chunks unloaded.
    pub fn unload_beyond(&mut self, viewer: Point2<f32>, radius: f32) -> usize {
        let far: Vec<ChunkCoord> = self
            .slots
            .keys()
            .copied()
            .filter(|coord| coord.distance_to(viewer) > radius)
            .collect();

        let mut unloaded = 0;
        for coord in far {
            if self.unload(coord) {
                unloaded += 1;
            }
        }

        let queued = &mut self.queued;
        self.load_queue.retain(|coord| {
            let keep = coord.distance_to(viewer) <= radius;
            if !keep {
                queued.remove(coord);
            }
            keep
        });
        unloaded
    }

    /// Removes a chunk. Refused while the chunk is in flight.
    pub fn unload(&mut self, coord: ChunkCoord) -> bool {
        if self.in_flight.contains(&coord) {
            return false;
        }
        let removed = self.slots.remove(&coord).is_some();
        if removed {
            debug!("Unloaded chunk ({}, {})", coord.x, coord.z);
        }
        removed
    }

    /// Moves a chunk out of its slot for a task and marks it in flight.
    ///
    /// Returns `None` if the coordinate is not resident or already checked out.
    pub fn check_out(&mut self, coord: ChunkCoord) -> Option<Box<Chunk>> {
        let slot = self.slots.get_mut(&coord)?;
        let chunk = slot.chunk.take()?;
        slot.last_state = chunk.state();
        self.in_flight.insert(coord);
        Some(chunk)
    }

    /// Returns a chunk from a task, clears its in-flight mark and synchronises the
    /// boundary shells it shares with resident neighbours.
    pub fn check_in(&mut self, mut chunk: Box<Chunk>) {
        let coord = chunk.position;
        self.in_flight.remove(&coord);

        if chunk.state() != ChunkState::UNLOADED {
            for side in HORIZONTAL_SIDES {
                let Some(neighbor) = self
                    .slots
                    .get_mut(&coord.neighbor(side))
                    .and_then(|slot| slot.chunk.as_deref_mut())
                else {
                    continue;
                };
                if neighbor.state() == ChunkState::UNLOADED {
                    continue;
                }
                if chunk.absorb_neighbor_boundary(side, neighbor) {
                    chunk.invalidate_mesh();
                }
                if neighbor.absorb_neighbor_boundary(side.opposite(), &chunk) {
                    neighbor.invalidate_mesh();
                }
            }
        }

        let slot = self
            .slots
            .entry(coord)
            .or_insert_with(|| ChunkSlot::new(coord));
        slot.last_state = chunk.state();
        slot.chunk = Some(chunk);
    }

    /// The resident, checked-in chunk owning the block at `position`.
    fn chunk_at_mut(&mut self, position: Point3<f32>) -> Option<&mut Chunk> {
        self.slots
            .get_mut(&ChunkCoord::from_world(position))
            .and_then(|slot| slot.chunk.as_deref_mut())
    }

    /// The material at a world position, or air when its chunk is not resident or is
    /// checked out.
    pub fn get_voxel(&self, position: Point3<f32>) -> Material {
        let Some(chunk) = self
            .slots
            .get(&ChunkCoord::from_world(position))
            .and_then(|slot| slot.chunk())
        else {
            return Material::AIR;
        };
        let local = chunk.world_to_local(position);
        chunk.get_voxel(local.x, local.y, local.z)
    }

    /// Whether the block at a world position is solid or liquid.
    ///
    /// A checked-out chunk reads as empty until it is checked back in.
    pub fn is_voxel_active(&self, position: Point3<f32>) -> bool {
        self.get_voxel(position).is_active()
    }

    /// Places `material` at a world position.
    ///
    /// Fails when the owning chunk is not resident, is checked out, has not been
    /// generated, or already has a voxel there.
    pub fn place_voxel(&mut self, position: Point3<f32>, material: Material) -> bool {
        let Some(chunk) = self.chunk_at_mut(position) else {
            return false;
        };
        if !chunk.place_voxel(position, material) {
            return false;
        }
        let coord = chunk.position;
        let local = chunk.world_to_local(position);
        self.propagate_edit(coord, local, material);
        true
    }

    /// Clears the voxel at a world position. Fails like `place_voxel`, or when the
    /// cell is already empty.
    pub fn delete_voxel(&mut self, position: Point3<f32>) -> bool {
        let Some(chunk) = self.chunk_at_mut(position) else {
            return false;
        };
        if !chunk.delete_voxel(position) {
            return false;
        }
        let coord = chunk.position;
        let local = chunk.world_to_local(position);
        self.propagate_edit(coord, local, Material::AIR);
        true
    }

    /// Mirrors an edited edge cell into the shells of the neighbours sharing its face.
    fn propagate_edit(&mut self, coord: ChunkCoord, local: Point3<i32>, material: Material) {
        for side in Chunk::sides_touching(local) {
            let Some(neighbor) = self
                .slots
                .get_mut(&coord.neighbor(side))
                .and_then(|slot| slot.chunk.as_deref_mut())
            else {
                // Checked-out neighbours catch up when they are checked back in.
                continue;
            };
            let (dx, dz) = side_offset(side);
            neighbor.set_voxel(
                local.x - dx * CHUNK_DIMENSION,
                local.y,
                local.z - dz * CHUNK_DIMENSION,
                material,
            );
            neighbor.invalidate_mesh();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::terrain::TerrainGenerator;

    fn generated(table: &mut ChunkTable, generator: &TerrainGenerator, coord: ChunkCoord) {
        table.enqueue(coord);
        table.drain_queue(1);
        let mut chunk = table.check_out(coord).expect("chunk is resident");
        chunk.generate(generator);
        table.check_in(chunk);
    }

    fn flat_chunk(coord: ChunkCoord) -> Box<Chunk> {
        let mut chunk = Box::new(Chunk::new(coord));
        for z in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                chunk.set_voxel(x, 0, z, Material::STONE);
            }
        }
        chunk
    }

    #[test]
    fn queue_skips_duplicates_and_bounds_instantiation() {
        let mut table = ChunkTable::new();
        assert!(table.enqueue(ChunkCoord::new(0, 0)));
        assert!(!table.enqueue(ChunkCoord::new(0, 0)));
        assert!(table.enqueue(ChunkCoord::new(1, 0)));
        assert!(table.enqueue(ChunkCoord::new(2, 0)));

        assert_eq!(table.drain_queue(2), vec![ChunkCoord::new(0, 0), ChunkCoord::new(1, 0)]);
        assert_eq!(table.len(), 2);
        assert!(!table.enqueue(ChunkCoord::new(0, 0)));
        assert_eq!(table.drain_queue(8), vec![ChunkCoord::new(2, 0)]);
        assert_eq!(table.slot(ChunkCoord::new(2, 0)).map(|s| s.state()), Some(ChunkState::UNLOADED));
    }

    #[test]
    fn in_flight_chunks_are_never_unloaded() {
        let mut table = ChunkTable::new();
        table.enqueue(ChunkCoord::new(10, 0));
        table.enqueue(ChunkCoord::new(11, 0));
        table.drain_queue(2);

        let chunk = table.check_out(ChunkCoord::new(10, 0)).expect("resident");
        assert!(table.check_out(ChunkCoord::new(10, 0)).is_none());
        assert!(table.slot(ChunkCoord::new(10, 0)).is_some_and(|s| s.is_checked_out()));

        assert_eq!(table.unload_beyond(Point2::new(0.0, 0.0), 4.0), 1);
        assert!(table.contains(ChunkCoord::new(10, 0)));
        assert!(!table.contains(ChunkCoord::new(11, 0)));

        table.check_in(chunk);
        assert!(table.in_flight().is_empty());
        assert_eq!(table.unload_beyond(Point2::new(0.0, 0.0), 4.0), 1);
        assert!(table.is_empty());
    }

    #[test]
    fn edits_refuse_checked_out_and_ungenerated_chunks() {
        let generator = TerrainGenerator::new(1);
        let mut table = ChunkTable::new();
        table.enqueue(ChunkCoord::new(0, 0));
        table.drain_queue(1);

        let above = Point3::new(4.5, 125.5, 4.5);
        assert!(!table.place_voxel(above, Material::STONE));

        let mut chunk = table.check_out(ChunkCoord::new(0, 0)).expect("resident");
        chunk.generate(&generator);
        assert!(!table.place_voxel(above, Material::STONE));
        table.check_in(chunk);

        assert!(table.place_voxel(above, Material::STONE));
        assert!(table.is_voxel_active(above));
        assert!(table.delete_voxel(above));
        assert!(!table.is_voxel_active(above));
    }

    #[test]
    fn checked_out_chunks_read_as_air_until_checked_in() {
        let generator = TerrainGenerator::new(5);
        let mut table = ChunkTable::new();
        let coord = ChunkCoord::new(0, 0);
        generated(&mut table, &generator, coord);

        let bedrock = Point3::new(3.5, 0.5, 9.5);
        assert_eq!(table.get_voxel(bedrock), Material::BEDROCK);

        let chunk = table.check_out(coord).expect("resident");
        assert!(!table.is_voxel_active(bedrock));
        assert_eq!(table.get_voxel(bedrock), Material::AIR);

        table.check_in(chunk);
        assert!(table.is_voxel_active(bedrock));
    }

    #[test]
    fn edge_edits_reach_the_neighbours_shell() {
        let generator = TerrainGenerator::new(2);
        let mut table = ChunkTable::new();
        let left = ChunkCoord::new(0, 0);
        let right = ChunkCoord::new(1, 0);
        generated(&mut table, &generator, left);
        generated(&mut table, &generator, right);

        let mut meshed = table.check_out(right).expect("resident");
        meshed.build_mesh(&generator);
        table.check_in(meshed);
        assert_eq!(table.slot(right).map(|s| s.state()), Some(ChunkState::MESHED));

        let edge = Point3::new(15.5, 125.5, 3.5);
        assert!(table.place_voxel(edge, Material::WOOD));
        let neighbor = table.slot(right).and_then(|s| s.chunk()).expect("resident");
        assert_eq!(neighbor.get_voxel(-1, 125, 3), Material::WOOD);
        assert_eq!(neighbor.state(), ChunkState::GENERATED);

        assert!(table.delete_voxel(edge));
        let neighbor = table.slot(right).and_then(|s| s.chunk()).expect("resident");
        assert_eq!(neighbor.get_voxel(-1, 125, 3), Material::AIR);
    }

    #[test]
    fn check_in_synchronises_shells_both_ways() {
        let mut table = ChunkTable::new();
        let left = ChunkCoord::new(0, 0);
        let right = ChunkCoord::new(1, 0);
        table.enqueue(left);
        table.enqueue(right);
        table.drain_queue(2);

        // Flat stand-ins without shells; the sync has to fill them in.
        let mut a = flat_chunk(left);
        let mut b = flat_chunk(right);
        a.force_state(ChunkState::GENERATED);
        b.force_state(ChunkState::GENERATED);
        let _ = table.check_out(left);
        let _ = table.check_out(right);
        table.check_in(a);
        table.check_in(b);

        let a = table.slot(left).and_then(|s| s.chunk()).expect("resident");
        let b = table.slot(right).and_then(|s| s.chunk()).expect("resident");
        assert_eq!(a.get_voxel(CHUNK_DIMENSION, 0, 7), Material::STONE);
        assert_eq!(b.get_voxel(-1, 0, 7), Material::STONE);
    }
}
