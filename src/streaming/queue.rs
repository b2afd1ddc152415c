//! Bounded background generation queue
//!
//! One worker thread pops requests FIFO, builds their meshes and sends the
//! results back over a channel that the control thread drains each tick.
//! The queue never touches the chunk map.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::chunk::ChunkCoord;
use crate::core::{Error, Result};
use crate::terrain::{ChunkMesher, MeshData};

/// A finished generation request
#[derive(Debug)]
pub struct GeneratedChunk {
    pub coord: ChunkCoord,
    /// The mesh, or a description of why building it failed
    pub result: std::result::Result<MeshData, String>,
    /// Generation time in microseconds (for profiling)
    pub generation_time_us: u64,
}

/// Snapshot of queue counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub queued: usize,
    pub generated: u64,
    pub failed: u64,
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    generated: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

/// State shared with the worker thread
struct Shared {
    pending: Mutex<VecDeque<ChunkCoord>>,
    running: AtomicBool,
    /// Set under the `pending` lock when a request is popped
    busy: AtomicBool,
    counters: Counters,
}

impl Shared {
    fn pending(&self) -> MutexGuard<'_, VecDeque<ChunkCoord>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Bounded FIFO of chunk requests served by one background worker
pub struct GenerationQueue {
    name: String,
    capacity: usize,
    shared: Arc<Shared>,
    result_rx: mpsc::UnboundedReceiver<GeneratedChunk>,
    worker: Option<JoinHandle<()>>,
}

impl GenerationQueue {
    /// Start a queue and its worker thread
    ///
    /// # Arguments
    /// * `name` - Label used for the thread name and logs
    /// * `mesher` - Builds one chunk's geometry on the worker
    /// * `capacity` - Maximum queued requests; extra requests are dropped
    /// * `idle_sleep` - Worker sleep when there is nothing to do
    pub fn new(
        name: &str,
        mesher: Arc<dyn ChunkMesher>,
        capacity: usize,
        idle_sleep: Duration,
    ) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::config("generation queue capacity must be at least 1"));
        }

        let shared = Arc::new(Shared {
            pending: Mutex::new(VecDeque::with_capacity(capacity)),
            running: AtomicBool::new(true),
            busy: AtomicBool::new(false),
            counters: Counters::default(),
        });
        let (result_tx, result_rx) = mpsc::unbounded_channel();

        let worker_shared = Arc::clone(&shared);
        let worker_name = name.to_string();
        let worker = std::thread::Builder::new()
            .name(format!("{name}-gen"))
            .spawn(move || {
                Self::worker_loop(&worker_name, &worker_shared, mesher.as_ref(), idle_sleep, result_tx)
            })
            .map_err(|e| Error::Streaming(format!("failed to spawn {name} worker: {e}")))?;

        log::info!("{name}: generation worker started (capacity {capacity})");

        Ok(Self {
            name: name.to_string(),
            capacity,
            shared,
            result_rx,
            worker: Some(worker),
        })
    }

    fn worker_loop(
        name: &str,
        shared: &Shared,
        mesher: &dyn ChunkMesher,
        idle_sleep: Duration,
        result_tx: mpsc::UnboundedSender<GeneratedChunk>,
    ) {
        while shared.running.load(Ordering::Acquire) {
            let next = {
                let mut pending = shared.pending();
                let next = pending.pop_front();
                if next.is_some() {
                    shared.busy.store(true, Ordering::Release);
                }
                next
            };

            let Some(coord) = next else {
                std::thread::sleep(idle_sleep);
                continue;
            };

            let start = Instant::now();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| mesher.build(coord)));
            let generation_time_us = start.elapsed().as_micros() as u64;

            let result = match outcome {
                Ok(Ok(mesh)) => {
                    shared.counters.generated.fetch_add(1, Ordering::Relaxed);
                    log::trace!("{name}: built chunk {coord} in {generation_time_us}us");
                    Ok(mesh)
                }
                Ok(Err(e)) => {
                    shared.counters.failed.fetch_add(1, Ordering::Relaxed);
                    log::warn!("{name}: generation failed for chunk {coord}: {e}");
                    Err(e.to_string())
                }
                Err(payload) => {
                    shared.counters.failed.fetch_add(1, Ordering::Relaxed);
                    let msg = panic_message(payload.as_ref());
                    log::error!("{name}: generation panicked for chunk {coord}: {msg}");
                    Err(msg)
                }
            };

            let sent = result_tx.send(GeneratedChunk { coord, result, generation_time_us });
            shared.busy.store(false, Ordering::Release);
            if sent.is_err() {
                // Receiver dropped; nobody is listening any more
                break;
            }
        }
        log::debug!("{name}: generation worker exiting");
    }

    /// Queue a request. Returns `false` (and drops it) when full.
    pub fn enqueue(&self, coord: ChunkCoord) -> bool {
        if !self.shared.running.load(Ordering::Acquire) {
            return false;
        }
        let mut pending = self.shared.pending();
        if pending.len() >= self.capacity {
            drop(pending);
            self.shared.counters.dropped.fetch_add(1, Ordering::Relaxed);
            log::trace!("{}: queue full, dropped request for {coord}", self.name);
            return false;
        }
        pending.push_back(coord);
        true
    }

    /// Collect all finished chunks without blocking
    pub fn drain(&mut self) -> Vec<GeneratedChunk> {
        let mut results = Vec::new();
        while let Ok(done) = self.result_rx.try_recv() {
            results.push(done);
        }
        results
    }

    /// Number of requests waiting (excluding one being built)
    pub fn len(&self) -> usize {
        self.shared.pending().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Nothing queued and nothing being built
    pub fn is_idle(&self) -> bool {
        let pending = self.shared.pending();
        pending.is_empty() && !self.shared.busy.load(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> QueueStats {
        let c = &self.shared.counters;
        QueueStats {
            queued: self.len(),
            generated: c.generated.load(Ordering::Relaxed),
            failed: c.failed.load(Ordering::Relaxed),
            dropped: c.dropped.load(Ordering::Relaxed),
        }
    }

    /// Stop the worker after its in-flight build and wait for it.
    ///
    /// Requests still queued are discarded. Idempotent.
    pub fn shutdown(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("{}: generation worker panicked during shutdown", self.name);
            }
            let discarded = {
                let mut pending = self.shared.pending();
                let n = pending.len();
                pending.clear();
                n
            };
            log::info!("{}: generation worker stopped ({discarded} queued requests discarded)", self.name);
        }
    }
}

impl Drop for GenerationQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
