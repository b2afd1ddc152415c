//! Per-tick streaming of terrain chunks and water planes
//!
//! Each tick, for each layer:
//! 1. find the observer's chunk
//! 2. fade out visible chunks that left the render window
//! 3. request missing chunks inside the window, nearest first
//! 4. take finished meshes from the generation queue
//! 5. advance fades and release fully faded chunks
//!
//! The controller only produces vertex data. The renderer owns its GPU
//! handles and keeps them in sync through the `evicted` and `delivered`
//! lists of each [`TickReport`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec3;

use crate::chunk::{ChunkCoord, CoordinateSystem};
use crate::config::TerrainConfig;
use crate::core::Result;
use crate::streaming::chunk::{Chunk, ChunkState};
use crate::streaming::priority::RingOrder;
use crate::streaming::queue::{GenerationQueue, QueueStats};
use crate::streaming::store::{ChunkStore, StateCounts};
use crate::terrain::{ChunkMesher, HeightField, MeshBuilder, WaterMesher};

/// What happened to one layer during a tick.
///
/// Renderers should release `evicted` before uploading `delivered`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerReport {
    /// Observer chunk used for this tick
    pub center: ChunkCoord,
    /// Coordinates newly queued for generation
    pub requested: Vec<ChunkCoord>,
    /// Requests refused by a full queue; retried next tick
    pub dropped: usize,
    /// FadingOut chunks that re-entered the window
    pub resurrected: Vec<ChunkCoord>,
    /// Chunks whose mesh arrived and is ready to upload
    pub delivered: Vec<ChunkCoord>,
    /// Chunks whose generation failed this tick
    pub failed: Vec<ChunkCoord>,
    /// Chunks removed from the layer; their geometry can be released
    pub evicted: Vec<ChunkCoord>,
}

/// Reports for both layers
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub terrain: LayerReport,
    pub water: LayerReport,
}

/// Counters for one layer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayerStats {
    pub states: StateCounts,
    pub queue: QueueStats,
}

/// Counters for both layers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamingStats {
    pub terrain: LayerStats,
    pub water: LayerStats,
}

/// One streamed grid: its chunk map, generation queue and window
struct ChunkLayer {
    name: &'static str,
    store: ChunkStore,
    queue: GenerationQueue,
    ring: RingOrder,
    /// Former entries to report as evicted on the next tick
    pending_evictions: Vec<ChunkCoord>,
}

impl ChunkLayer {
    fn new(
        name: &'static str,
        mesher: Arc<dyn ChunkMesher>,
        render_distance: u32,
        config: &TerrainConfig,
    ) -> Result<Self> {
        let queue = GenerationQueue::new(
            name,
            mesher,
            config.streaming.queue_capacity,
            config.streaming.idle_sleep(),
        )?;
        Ok(Self {
            name,
            store: ChunkStore::new(),
            queue,
            ring: RingOrder::new(render_distance),
            pending_evictions: Vec::new(),
        })
    }

    fn render_distance(&self) -> u32 {
        self.ring.radius()
    }

    fn set_render_distance(&mut self, render_distance: u32) {
        if self.ring.radius() != render_distance {
            self.ring = RingOrder::new(render_distance);
        }
    }

    fn update(
        &mut self,
        center: ChunkCoord,
        now: Instant,
        fade_in: Duration,
        fade_out: Duration,
    ) -> LayerReport {
        let mut report = LayerReport {
            center,
            evicted: std::mem::take(&mut self.pending_evictions),
            ..Default::default()
        };
        let render_distance = self.render_distance();

        // Leave the window
        let mut abandoned = Vec::new();
        for chunk in self.store.iter_mut() {
            if chunk.coord.chebyshev_distance(center) <= render_distance {
                continue;
            }
            match chunk.state() {
                ChunkState::Active | ChunkState::FadingIn => {
                    chunk.begin_fade_out(now);
                    log::trace!("{}: chunk {} fading out", self.name, chunk.coord);
                }
                ChunkState::Pending if chunk.generation_failed() => abandoned.push(chunk.coord),
                _ => {}
            }
        }
        for coord in abandoned {
            self.store.remove(coord);
            report.evicted.push(coord);
        }

        // Fill the window, nearest first
        for coord in self.ring.around(center) {
            match self.store.get_mut(coord) {
                Some(chunk) => {
                    if chunk.resurrect(now) {
                        log::trace!("{}: chunk {} re-entered the window", self.name, coord);
                        report.resurrected.push(coord);
                    }
                }
                None => {
                    if self.queue.enqueue(coord) {
                        self.store.insert_pending(coord);
                        report.requested.push(coord);
                    } else {
                        report.dropped += 1;
                    }
                }
            }
        }

        // Completed generation
        for done in self.queue.drain() {
            let Some(chunk) = self.store.get_mut(done.coord) else {
                log::debug!("{}: discarding mesh for untracked chunk {}", self.name, done.coord);
                continue;
            };
            match done.result {
                Ok(mesh) => {
                    if chunk.deliver(mesh, now) {
                        report.delivered.push(done.coord);
                    } else {
                        log::debug!(
                            "{}: discarding mesh for chunk {} in state {:?}",
                            self.name,
                            done.coord,
                            chunk.state()
                        );
                    }
                }
                Err(_) => {
                    chunk.mark_failed();
                    report.failed.push(done.coord);
                }
            }
        }

        // Fades
        report.evicted.extend(self.store.advance(now, fade_in, fade_out));

        report
    }

    fn stats(&self) -> LayerStats {
        LayerStats {
            states: self.store.state_counts(),
            queue: self.queue.stats(),
        }
    }

    /// Swap in a new queue and forget every chunk
    fn reset(&mut self, queue: GenerationQueue) {
        self.queue.shutdown();
        self.queue = queue;
        let cleared = self.store.clear();
        self.pending_evictions.extend(cleared);
    }
}

/// Where the layers' meshers come from when generation is reconfigured
enum MesherSource {
    /// Built from each new configuration
    Config,
    /// Supplied by the caller; kept across reconfiguration
    Custom {
        terrain: Arc<dyn ChunkMesher>,
        water: Arc<dyn ChunkMesher>,
    },
}

impl MesherSource {
    fn meshers(&self, config: &TerrainConfig) -> Result<(Arc<dyn ChunkMesher>, Arc<dyn ChunkMesher>)> {
        match self {
            MesherSource::Config => StreamingController::default_meshers(config),
            MesherSource::Custom { terrain, water } => Ok((terrain.clone(), water.clone())),
        }
    }
}

/// Streams terrain chunks and water planes around a moving observer
pub struct StreamingController {
    config: TerrainConfig,
    coords: CoordinateSystem,
    terrain: ChunkLayer,
    water: ChunkLayer,
    meshers: MesherSource,
    last_center: Option<ChunkCoord>,
}

impl StreamingController {
    /// Build the height field, meshers and worker threads from `config`
    pub fn new(config: TerrainConfig) -> Result<Self> {
        Self::build(config, MesherSource::Config)
    }

    /// Build with caller-supplied meshers for the two layers.
    ///
    /// The same meshers are kept when [`reconfigure`](Self::reconfigure)
    /// restarts generation; they are responsible for honouring any new
    /// chunk or terrain settings themselves.
    pub fn with_meshers(
        config: TerrainConfig,
        terrain_mesher: Arc<dyn ChunkMesher>,
        water_mesher: Arc<dyn ChunkMesher>,
    ) -> Result<Self> {
        Self::build(
            config,
            MesherSource::Custom {
                terrain: terrain_mesher,
                water: water_mesher,
            },
        )
    }

    fn build(config: TerrainConfig, meshers: MesherSource) -> Result<Self> {
        config.validate()?;
        let coords = CoordinateSystem::new(&config.chunk)?;
        let (terrain_mesher, water_mesher) = meshers.meshers(&config)?;
        let terrain = ChunkLayer::new("terrain", terrain_mesher, config.streaming.render_distance, &config)?;
        let water = ChunkLayer::new("water", water_mesher, config.streaming.water_render_distance, &config)?;

        log::info!(
            "Streaming controller ready: chunk {}u, {} vertices/side, render distance {} (water {})",
            coords.chunk_size(),
            coords.vertices_per_side(),
            config.streaming.render_distance,
            config.streaming.water_render_distance
        );

        Ok(Self {
            config,
            coords,
            terrain,
            water,
            meshers,
            last_center: None,
        })
    }

    fn default_meshers(config: &TerrainConfig) -> Result<(Arc<dyn ChunkMesher>, Arc<dyn ChunkMesher>)> {
        let coords = CoordinateSystem::new(&config.chunk)?;
        let field = HeightField::new(
            config.terrain.clone(),
            config.noise.clone(),
            config.biomes.clone(),
        )?;
        let terrain: Arc<dyn ChunkMesher> = Arc::new(MeshBuilder::new(Arc::new(field), coords));
        let water: Arc<dyn ChunkMesher> = Arc::new(WaterMesher::new(coords, config.streaming.water_level));
        Ok((terrain, water))
    }

    /// Run one tick for an observer at `observer`
    pub fn update(&mut self, observer: Vec3, now: Instant) -> TickReport {
        let center = self.coords.chunk_at(observer);
        if self.last_center != Some(center) {
            log::debug!("Observer entered chunk {center}");
            self.last_center = Some(center);
        }

        let fade_in = self.config.streaming.fade_in();
        let fade_out = self.config.streaming.fade_out();
        let report = TickReport {
            terrain: self.terrain.update(center, now, fade_in, fade_out),
            water: self.water.update(center, now, fade_in, fade_out),
        };

        let busy = !report.terrain.delivered.is_empty()
            || !report.terrain.evicted.is_empty()
            || !report.water.delivered.is_empty()
            || !report.water.evicted.is_empty();
        if busy {
            log::debug!(
                "Tick at {center}: terrain +{} -{} ({} requested, {} dropped), water +{} -{}",
                report.terrain.delivered.len(),
                report.terrain.evicted.len(),
                report.terrain.requested.len(),
                report.terrain.dropped,
                report.water.delivered.len(),
                report.water.evicted.len()
            );
        }
        report
    }

    /// Apply a new configuration.
    ///
    /// Window and fade changes take effect on the next tick. Changes that
    /// affect generated geometry restart both queues and clear both layers;
    /// the cleared chunks are reported as evicted on the next tick.
    pub fn reconfigure(&mut self, config: TerrainConfig) -> Result<()> {
        config.validate()?;

        if self.config.generation_differs(&config) {
            let (terrain_mesher, water_mesher) = self.meshers.meshers(&config)?;
            let coords = CoordinateSystem::new(&config.chunk)?;
            let terrain_queue = GenerationQueue::new(
                "terrain",
                terrain_mesher,
                config.streaming.queue_capacity,
                config.streaming.idle_sleep(),
            )?;
            let water_queue = GenerationQueue::new(
                "water",
                water_mesher,
                config.streaming.queue_capacity,
                config.streaming.idle_sleep(),
            )?;
            self.terrain.reset(terrain_queue);
            self.water.reset(water_queue);
            self.coords = coords;
            log::info!("Terrain generation reconfigured; all chunks will regenerate");
        }

        self.terrain.set_render_distance(config.streaming.render_distance);
        self.water.set_render_distance(config.streaming.water_render_distance);
        self.config = config;
        Ok(())
    }

    /// Stop both generation workers
    pub fn shutdown(&mut self) {
        self.terrain.queue.shutdown();
        self.water.queue.shutdown();
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn coords(&self) -> &CoordinateSystem {
        &self.coords
    }

    pub fn terrain_chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.terrain.store.iter()
    }

    pub fn water_planes(&self) -> impl Iterator<Item = &Chunk> {
        self.water.store.iter()
    }

    pub fn terrain_chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.terrain.store.get(coord)
    }

    pub fn water_plane(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.water.store.get(coord)
    }

    /// Whether both queues have nothing queued or in flight
    pub fn is_idle(&self) -> bool {
        self.terrain.queue.is_idle() && self.water.queue.is_idle()
    }

    pub fn stats(&self) -> StreamingStats {
        StreamingStats {
            terrain: self.terrain.stats(),
            water: self.water.stats(),
        }
    }
}

impl Drop for StreamingController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
