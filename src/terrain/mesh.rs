//! Chunk meshing: samples the height field into triangle lists
//!
//! Every vertex is 11 floats: position (3), normal (3), color (3), uv (2).
//! That layout is what the renderer uploads, so [`Vertex`] is `#[repr(C)]`
//! and `Pod` and the buffer can be viewed as a flat `&[f32]`.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::generator::HeightField;
use crate::chunk::{ChunkCoord, CoordinateSystem};
use crate::core::{Error, Result};

/// Floats per vertex in the output buffer
pub const FLOATS_PER_VERTEX: usize = 11;

/// Vertices emitted per grid cell (two triangles)
pub const VERTICES_PER_QUAD: usize = 6;

/// A single interleaved vertex
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
    pub uv: [f32; 2],
}

const _: () = assert!(std::mem::size_of::<Vertex>() == FLOATS_PER_VERTEX * std::mem::size_of::<f32>());

impl Vertex {
    fn new(position: Vec3, normal: Vec3, color: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            color,
            uv,
        }
    }
}

/// Generated geometry for one chunk
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub coord: ChunkCoord,
    pub vertices: Vec<Vertex>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// The buffer in the flat 11-float-per-vertex layout
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// The buffer as raw bytes, ready for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// How vertex normals are derived
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadingMode {
    /// One normal per quad from three of its corners
    #[default]
    Flat,
    /// Per-corner normals from the 8-neighbour ring
    Smooth,
}

/// Builds geometry for a chunk coordinate.
///
/// Implementations run on the generation worker thread, so they must be
/// pure with respect to the coordinate.
pub trait ChunkMesher: Send + Sync + 'static {
    fn build(&self, coord: ChunkCoord) -> Result<MeshData>;
}

/// Terrain mesher over a shared height field
#[derive(Clone, Debug)]
pub struct MeshBuilder {
    field: Arc<HeightField>,
    coords: CoordinateSystem,
}

impl MeshBuilder {
    pub fn new(field: Arc<HeightField>, coords: CoordinateSystem) -> Self {
        Self { field, coords }
    }

    pub fn field(&self) -> &HeightField {
        &self.field
    }

    /// Vertex count every terrain chunk has
    pub fn vertices_per_chunk(&self) -> usize {
        let n = self.coords.vertices_per_side() as usize;
        n * n * VERTICES_PER_QUAD
    }

    /// Sample the height field over the chunk grid
    pub fn build_chunk_mesh(&self, coord: ChunkCoord) -> Result<MeshData> {
        let n = self.coords.vertices_per_side();
        let inv_n = 1.0 / n as f32;
        let params = self.field.params();
        let shading = params.shading;
        let spacing = self.coords.vertex_spacing();

        let flip_u = params.flip_alternate_uvs && coord.x.rem_euclid(2) == 1;
        let flip_v = params.flip_alternate_uvs && coord.z.rem_euclid(2) == 1;
        let uv = |i: u32, j: u32| {
            let u = i as f32 * inv_n;
            let v = j as f32 * inv_n;
            [if flip_u { 1.0 - u } else { u }, if flip_v { 1.0 - v } else { v }]
        };
        let corner = |i: u32, j: u32| {
            let w = self.coords.grid_to_world(coord, i, j);
            self.field.position(w.x, w.y)
        };

        let mut vertices = Vec::with_capacity(self.vertices_per_chunk());

        for i in 0..n {
            for j in 0..n {
                let p1 = corner(i, j);
                let p2 = corner(i + 1, j);
                let p3 = corner(i + 1, j + 1);
                let p4 = corner(i, j + 1);

                if !(p1.is_finite() && p2.is_finite() && p3.is_finite() && p4.is_finite()) {
                    return Err(Error::Mesh(format!(
                        "non-finite height sample in chunk {coord} at cell ({i}, {j})"
                    )));
                }

                let center = self.coords.local_to_world(
                    (i as f32 + 0.5) * inv_n,
                    (j as f32 + 0.5) * inv_n,
                    coord,
                );
                let color = self.field.color(center.x, center.y);

                let [n1, n2, n3, n4] = match shading {
                    ShadingMode::Flat => {
                        let flat = (p4 - p1).cross(p2 - p1).try_normalize().unwrap_or(Vec3::Y);
                        [flat; 4]
                    }
                    ShadingMode::Smooth => [p1, p2, p3, p4]
                        .map(|p| self.field.ring_normal(p.x, p.z, spacing)),
                };

                let v1 = Vertex::new(p1, n1, color, uv(i, j));
                let v2 = Vertex::new(p2, n2, color, uv(i + 1, j));
                let v3 = Vertex::new(p3, n3, color, uv(i + 1, j + 1));
                let v4 = Vertex::new(p4, n4, color, uv(i, j + 1));

                // Counter-clockwise seen from +Y
                vertices.extend_from_slice(&[v1, v4, v3, v1, v3, v2]);
            }
        }

        Ok(MeshData { coord, vertices })
    }
}

impl ChunkMesher for MeshBuilder {
    fn build(&self, coord: ChunkCoord) -> Result<MeshData> {
        self.build_chunk_mesh(coord)
    }
}

/// Flat water quad covering one chunk
#[derive(Clone, Debug)]
pub struct WaterMesher {
    coords: CoordinateSystem,
    water_level: f32,
}

impl WaterMesher {
    /// Fixed water tint
    pub const COLOR: [f32; 3] = [0.16, 0.42, 0.68];

    pub fn new(coords: CoordinateSystem, water_level: f32) -> Self {
        Self { coords, water_level }
    }

    pub fn water_level(&self) -> f32 {
        self.water_level
    }
}

impl ChunkMesher for WaterMesher {
    fn build(&self, coord: ChunkCoord) -> Result<MeshData> {
        let at = |lx: f32, lz: f32| {
            let w = self.coords.local_to_world(lx, lz, coord);
            Vec3::new(w.x, self.water_level, w.y)
        };
        let v = |lx: f32, lz: f32| Vertex::new(at(lx, lz), Vec3::Y, Self::COLOR, [lx, lz]);

        let (v1, v2, v3, v4) = (v(0.0, 0.0), v(1.0, 0.0), v(1.0, 1.0), v(0.0, 1.0));
        Ok(MeshData {
            coord,
            vertices: vec![v1, v4, v3, v1, v3, v2],
        })
    }
}
