//! Chunk grid coordinates and chunk/local/world transforms

pub mod coord;

pub use coord::{ChunkConfig, ChunkCoord, CoordinateSystem};
