//! # Voxel Task System
//!
//! This module contains tasks related to voxel world generation. They run on the
//! worker pool so that the main loop never waits on terrain generation.

pub mod chunk_generation_task;
