//! Chunk coordinates and the chunk ↔ local ↔ world mapping
//!
//! Chunks are square tiles on the XZ plane. A chunk at `(cx, cz)` covers
//! world `[cx * size, (cx + 1) * size)` on X and likewise on Z. Local
//! coordinates are parametric in `[0, 1]` across one chunk.

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result, Vec2, Vec3};

/// Integer coordinate identifying a chunk in the world grid
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    /// Create a new chunk coordinate
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Pack into a single `u64`: `x` in the high half, `z` in the low half.
    ///
    /// Each half holds the two's-complement bit pattern of its `i32`, so
    /// negative coordinates never sign-extend into the other half.
    pub const fn pack(self) -> u64 {
        ((self.x as u32 as u64) << 32) | (self.z as u32 as u64)
    }

    /// Inverse of [`ChunkCoord::pack`]
    pub const fn unpack(key: u64) -> Self {
        Self {
            x: (key >> 32) as u32 as i32,
            z: key as u32 as i32,
        }
    }

    /// Chebyshev (chessboard) distance in chunks
    pub fn chebyshev_distance(self, other: ChunkCoord) -> u32 {
        let dx = (self.x as i64 - other.x as i64).unsigned_abs();
        let dz = (self.z as i64 - other.z as i64).unsigned_abs();
        dx.max(dz) as u32
    }

    /// Offset this coordinate by a number of chunks
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.x.wrapping_add(dx), self.z.wrapping_add(dz))
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Chunk dimensions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    /// World units per chunk side
    pub chunk_size: f32,
    /// World units between height samples
    pub vertex_spacing: f32,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 25.0,
            vertex_spacing: 0.5,
        }
    }
}

impl ChunkConfig {
    /// Reject dimensions that would produce degenerate geometry
    pub fn validate(&self) -> Result<()> {
        if !self.chunk_size.is_finite() || self.chunk_size <= 0.0 {
            return Err(Error::config(format!(
                "chunk_size must be a positive finite number, got {}",
                self.chunk_size
            )));
        }
        if !self.vertex_spacing.is_finite() || self.vertex_spacing <= 0.0 {
            return Err(Error::config(format!(
                "vertex_spacing must be a positive finite number, got {}",
                self.vertex_spacing
            )));
        }
        if self.vertex_spacing >= self.chunk_size {
            return Err(Error::config(format!(
                "vertex_spacing ({}) must be smaller than chunk_size ({})",
                self.vertex_spacing, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Validated chunk geometry and the transforms built on it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateSystem {
    chunk_size: f32,
    vertex_spacing: f32,
    vertices_per_side: u32,
}

impl CoordinateSystem {
    /// Build from a chunk configuration, failing fast on bad dimensions
    pub fn new(config: &ChunkConfig) -> Result<Self> {
        config.validate()?;
        let vertices_per_side = (config.chunk_size / config.vertex_spacing).round() as u32;
        Ok(Self {
            chunk_size: config.chunk_size,
            vertex_spacing: config.vertex_spacing,
            vertices_per_side: vertices_per_side.max(1),
        })
    }

    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    pub fn vertex_spacing(&self) -> f32 {
        self.vertex_spacing
    }

    /// Grid cells along one chunk edge
    pub fn vertices_per_side(&self) -> u32 {
        self.vertices_per_side
    }

    /// World units between neighbouring grid vertices
    pub fn cell_size(&self) -> f32 {
        self.chunk_size / self.vertices_per_side as f32
    }

    /// Map local `[0, 1]` coordinates inside `chunk` to world XZ.
    ///
    /// The chunk index and local offset are summed before scaling, so
    /// `local = 1.0` lands exactly on the neighbouring chunk's `0.0` edge.
    pub fn local_to_world(&self, local_x: f32, local_z: f32, chunk: ChunkCoord) -> Vec2 {
        Vec2::new(
            (chunk.x as f32 + local_x) * self.chunk_size,
            (chunk.z as f32 + local_z) * self.chunk_size,
        )
    }

    /// World XZ of grid vertex `(i, j)` of `chunk`, with `i, j` in `0..=n`.
    ///
    /// Positions come from the global vertex index, so a vertex on a shared
    /// edge is bit-identical whichever chunk it is built from.
    pub fn grid_to_world(&self, chunk: ChunkCoord, i: u32, j: u32) -> Vec2 {
        let n = self.vertices_per_side as i64;
        let cell = self.cell_size();
        Vec2::new(
            (chunk.x as i64 * n + i as i64) as f32 * cell,
            (chunk.z as i64 * n + j as i64) as f32 * cell,
        )
    }

    /// Chunk containing a world XZ position.
    ///
    /// Boundary points belong to the chunk whose minimum edge they lie on.
    pub fn world_to_chunk(&self, world_x: f32, world_z: f32) -> ChunkCoord {
        ChunkCoord::new(
            (world_x / self.chunk_size).floor() as i32,
            (world_z / self.chunk_size).floor() as i32,
        )
    }

    /// Chunk containing a 3D position (Y ignored)
    pub fn chunk_at(&self, pos: Vec3) -> ChunkCoord {
        self.world_to_chunk(pos.x, pos.z)
    }

    /// World XZ of the chunk's minimum corner
    pub fn chunk_origin(&self, chunk: ChunkCoord) -> Vec2 {
        self.local_to_world(0.0, 0.0, chunk)
    }

    /// World XZ of the chunk's centre
    pub fn chunk_center(&self, chunk: ChunkCoord) -> Vec2 {
        self.local_to_world(0.5, 0.5, chunk)
    }
}
