use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use cgmath::Point3;
use voxel_world::config::WorldConfig;
use voxel_world::engine_state::camera_state::Viewer;
use voxel_world::engine_state::voxels::block::block_type::Material;
use voxel_world::engine_state::voxels::chunk::{ChunkCoord, ChunkState};
use voxel_world::engine_state::voxels::manager::ChunkManager;

const MAX_FRAMES: usize = 4000;

fn config() -> WorldConfig {
    WorldConfig {
        seed: 2024,
        load_radius: 2,
        max_chunks_per_frame: 8,
        max_render_distance: 64.0,
        worker_threads: 2,
        ..WorldConfig::default()
    }
}

fn viewer_at(x: f32, z: f32) -> Viewer {
    Viewer::new(Point3::new(x, 100.0, z), 0.1, 64.0)
}

/// Every in-flight coordinate must still be resident.
fn assert_in_flight_is_resident(manager: &ChunkManager) {
    let table = manager.table().get();
    for coord in table.in_flight() {
        assert!(table.contains(*coord), "{coord:?} in flight but not resident");
        assert!(
            table.slot(*coord).is_some_and(|slot| slot.is_checked_out()),
            "{coord:?} in flight but still in its slot"
        );
    }
}

fn state_of(manager: &ChunkManager, coord: ChunkCoord) -> Option<ChunkState> {
    let table = manager.table().get();
    table
        .slot(coord)
        .filter(|slot| !slot.is_checked_out())
        .map(|slot| slot.state())
}

/// Ticks until `done` holds, checking the in-flight invariant after every frame.
fn tick_until<F>(manager: &mut ChunkManager, viewer: &Viewer, mut done: F) -> bool
where
    F: FnMut(&ChunkManager) -> bool,
{
    for _ in 0..MAX_FRAMES {
        manager.tick(viewer);
        assert_in_flight_is_resident(manager);
        if done(manager) {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    false
}

#[test]
fn viewer_chunk_is_eventually_meshed() {
    let mut manager = ChunkManager::new(config());
    let viewer = viewer_at(8.0, 8.0);
    let origin = ChunkCoord::new(0, 0);

    assert!(tick_until(&mut manager, &viewer, |m| {
        state_of(m, origin) == Some(ChunkState::MESHED)
    }));

    let list = manager.render_list();
    let info = list.iter().find(|info| info.coord == origin).expect("resident");
    assert!(info.visible);
    assert_eq!(info.origin, Point3::new(0, 0, 0));
    let mesh = info.mesh.as_ref().expect("meshed chunks carry their mesh");
    assert!(!mesh.is_empty());
    assert_eq!(mesh.indices().len() % 6, 0);
}

#[test]
fn chunks_in_flight_survive_leaving_the_unload_radius() {
    let mut manager = ChunkManager::new(config());
    let near = viewer_at(8.0, 8.0);
    manager.tick(&near);
    assert_in_flight_is_resident(&manager);

    let far = viewer_at(8.0 + 16.0 * 100.0, 8.0);
    for _ in 0..MAX_FRAMES {
        let held: HashSet<ChunkCoord> = manager.table().get().in_flight().clone();
        manager.tick(&far);
        let table = manager.table().get();
        for coord in &held {
            assert!(table.contains(*coord), "{coord:?} unloaded while held by a task");
        }
        if !table.contains(ChunkCoord::new(0, 0)) {
            return;
        }
        drop(table);
        thread::sleep(Duration::from_millis(2));
    }
    panic!("chunk (0, 0) was never unloaded");
}

#[test]
fn edits_round_trip_and_invalidate_the_mesh() {
    let mut manager = ChunkManager::new(config());
    let viewer = viewer_at(8.0, 8.0);
    let origin = ChunkCoord::new(0, 0);
    assert!(tick_until(&mut manager, &viewer, |m| {
        state_of(m, origin) == Some(ChunkState::MESHED)
    }));

    let sky = Point3::new(5.5, 125.5, 6.5);
    assert!(!manager.is_voxel_active(sky));
    assert!(!manager.delete_voxel(sky));
    assert!(manager.place_voxel(sky, Material::STONE));
    assert!(!manager.place_voxel(sky, Material::DIRT));
    assert_eq!(manager.get_voxel(sky), Material::STONE);
    assert_eq!(state_of(&manager, origin), Some(ChunkState::GENERATED));

    let info = manager
        .render_list()
        .into_iter()
        .find(|info| info.coord == origin)
        .expect("resident");
    assert!(info.mesh.is_none());

    assert!(manager.delete_voxel(sky));
    assert!(!manager.is_voxel_active(sky));

    assert!(tick_until(&mut manager, &viewer, |m| {
        state_of(m, origin) == Some(ChunkState::MESHED)
    }));
}

#[test]
fn edits_outside_resident_chunks_are_refused() {
    let mut manager = ChunkManager::new(config());
    let nowhere = Point3::new(5000.5, 125.5, 5000.5);
    assert!(!manager.place_voxel(nowhere, Material::STONE));
    assert!(!manager.delete_voxel(nowhere));
    assert_eq!(manager.get_voxel(nowhere), Material::AIR);
}

#[test]
fn equal_seeds_stream_equal_worlds() {
    let viewer = viewer_at(8.0, 8.0);
    let origin = ChunkCoord::new(0, 0);
    let mut first = ChunkManager::new(config());
    let mut second = ChunkManager::new(config());
    for manager in [&mut first, &mut second] {
        assert!(tick_until(manager, &viewer, |m| {
            state_of(m, origin) == Some(ChunkState::MESHED)
        }));
    }

    let a = first.table().get();
    let b = second.table().get();
    let a = a.slot(origin).and_then(|slot| slot.chunk()).expect("resident");
    let b = b.slot(origin).and_then(|slot| slot.chunk()).expect("resident");
    assert_eq!(a.blocks(), b.blocks());
}
