//! Shared helpers for streaming integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use glam::Vec3;
use terrastream::terrain::{ChunkMesher, MeshData};
use terrastream::{ChunkCoord, Error, Result, StreamingController, TerrainConfig, TickReport};

pub const CHUNK: f32 = 25.0;

/// Mesher that returns an empty mesh immediately
pub struct EmptyMesher;

impl ChunkMesher for EmptyMesher {
    fn build(&self, coord: ChunkCoord) -> Result<MeshData> {
        Ok(MeshData { coord, vertices: Vec::new() })
    }
}

/// Mesher that blocks until its gate opens
pub struct GatedMesher {
    pub open: Arc<AtomicBool>,
}

impl ChunkMesher for GatedMesher {
    fn build(&self, coord: ChunkCoord) -> Result<MeshData> {
        while !self.open.load(Ordering::Acquire) {
            std::thread::sleep(Duration::from_millis(1));
        }
        Ok(MeshData { coord, vertices: Vec::new() })
    }
}

/// Mesher that fails for one coordinate
pub struct FailingMesher {
    pub bad: ChunkCoord,
}

impl ChunkMesher for FailingMesher {
    fn build(&self, coord: ChunkCoord) -> Result<MeshData> {
        if coord == self.bad {
            return Err(Error::Mesh(format!("cannot build {coord}")));
        }
        Ok(MeshData { coord, vertices: Vec::new() })
    }
}

/// Small window, short fades, fast worker
pub fn test_config(render_distance: u32, water_render_distance: u32) -> TerrainConfig {
    terrastream::core::logging::init_for_tests();
    let mut config = TerrainConfig::default();
    config.streaming.render_distance = render_distance;
    config.streaming.water_render_distance = water_render_distance;
    config.streaming.fade_in_ms = 200;
    config.streaming.fade_out_ms = 200;
    config.streaming.idle_sleep_ms = 1;
    config
}

pub fn empty_controller(config: TerrainConfig) -> StreamingController {
    StreamingController::with_meshers(config, Arc::new(EmptyMesher), Arc::new(EmptyMesher)).unwrap()
}

/// World position at the centre of a chunk
pub fn center_of(x: i32, z: i32) -> Vec3 {
    Vec3::new(x as f32 * CHUNK + CHUNK * 0.5, 10.0, z as f32 * CHUNK + CHUNK * 0.5)
}

/// Tick at a fixed instant until nothing is waiting for generation
pub fn pump(ctl: &mut StreamingController, observer: Vec3, now: Instant) -> Vec<TickReport> {
    let mut reports = Vec::new();
    let deadline = Instant::now() + Duration::from_secs(20);
    loop {
        reports.push(ctl.update(observer, now));
        let stats = ctl.stats();
        let waiting = (stats.terrain.states.pending - stats.terrain.states.failed)
            + (stats.water.states.pending - stats.water.states.failed);
        if waiting == 0 || Instant::now() > deadline {
            break;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    reports
}
