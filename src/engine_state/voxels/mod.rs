//! # Voxels
//!
//! Voxel data, terrain generation and chunk streaming.
//!
//! ## Architecture
//!
//! * **Block**: materials, faces and the per-face texture table
//! * **Chunk**: a dense grid of materials plus the boundary shell copied from its
//!   four horizontal neighbours
//! * **Terrain**: the seeded, order-independent terrain function and tree placement
//! * **World**: the `ChunkTable`, sole owner of resident chunks and the in-flight set
//! * **Manager**: the per-frame scheduler deciding what to load, generate, mesh and unload
//! * **Tasks**: background generation; meshing tasks live under `rendering`
//!
//! ## Data Flow
//!
//! 1. The manager queues coordinates around the viewer and instantiates a few per frame
//! 2. Visible chunks are checked out of the table and handed to worker tasks
//! 3. Finished chunks are checked back in and their shells synchronised with neighbours
//! 4. Edits go through the table, which refuses chunks that a task holds
//!
//! ## Thread Safety
//!
//! A chunk is owned by exactly one place at a time: its table slot or the task that
//! checked it out. The table itself sits behind a single `MtResource` lock.

pub mod block;
pub mod chunk;
pub mod manager;
pub mod tasks;
pub mod terrain;
pub mod world;
