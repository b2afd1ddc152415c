//! Chunk streaming: lifecycle, generation queue and the per-tick controller

pub mod config;
pub mod chunk;
pub mod store;
pub mod priority;
pub mod queue;
pub mod controller;

pub use config::StreamingConfig;
pub use chunk::{Chunk, ChunkState, FadeStep};
pub use store::{ChunkStore, StateCounts};
pub use priority::{ChunkPriority, RingOrder};
pub use queue::{GeneratedChunk, GenerationQueue, QueueStats};
pub use controller::{LayerReport, LayerStats, StreamingController, StreamingStats, TickReport};
