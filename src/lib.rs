//! Terrastream - streaming procedural terrain core
//!
//! Generates an unbounded height-field landscape chunk by chunk around a
//! moving observer. Meshes are built on a background worker and handed to
//! an external renderer as flat 11-float vertex buffers.

pub mod core;
pub mod chunk;
pub mod terrain;
pub mod streaming;
pub mod config;

pub use crate::chunk::{ChunkCoord, CoordinateSystem};
pub use crate::config::TerrainConfig;
pub use crate::core::{Error, Result};
pub use crate::streaming::{StreamingController, TickReport};
pub use crate::terrain::{HeightField, MeshBuilder, MeshData, Vertex};
