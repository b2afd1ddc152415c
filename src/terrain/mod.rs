//! Procedural terrain: noise, height field, biome colors, chunk meshing

pub mod noise;
pub use noise::{NoiseField, NoiseParams};

pub mod generator;
pub use generator::{HeightField, TerrainParams};

pub mod biome;
pub use biome::{Biome, BiomeThresholds, Colorizer, MountainStyle};

pub mod mesh;
pub use mesh::{
    ChunkMesher, MeshBuilder, MeshData, ShadingMode, Vertex, WaterMesher, FLOATS_PER_VERTEX,
    VERTICES_PER_QUAD,
};
