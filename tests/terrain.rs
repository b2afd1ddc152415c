//! Height field determinism and chunk seams

use std::collections::HashMap;
use std::sync::Arc;

use terrastream::terrain::{BiomeThresholds, NoiseParams, ShadingMode, TerrainParams, FLOATS_PER_VERTEX};
use terrastream::{ChunkCoord, CoordinateSystem, HeightField, MeshBuilder, TerrainConfig};

fn field(config: &TerrainConfig) -> HeightField {
    HeightField::new(config.terrain.clone(), config.noise.clone(), config.biomes.clone()).unwrap()
}

fn builder(config: &TerrainConfig) -> MeshBuilder {
    let coords = CoordinateSystem::new(&config.chunk).unwrap();
    MeshBuilder::new(Arc::new(field(config)), coords)
}

/// Heights along the x = `edge_x` edge of a mesh, keyed by z bit pattern
fn edge_heights(vertices: &[terrastream::Vertex], edge_x: f32) -> HashMap<u32, f32> {
    vertices
        .iter()
        .filter(|v| v.position[0] == edge_x)
        .map(|v| (v.position[2].to_bits(), v.position[1]))
        .collect()
}

#[test]
fn height_is_repeatable() {
    let config = TerrainConfig::default();
    let a = field(&config);
    let first = a.height(100.0, 250.0);
    for _ in 0..10 {
        assert_eq!(a.height(100.0, 250.0).to_bits(), first.to_bits());
    }

    // A second field from the same parameters agrees bit for bit
    let b = field(&config);
    assert_eq!(b.height(100.0, 250.0).to_bits(), first.to_bits());
}

#[test]
fn different_seeds_differ() {
    let config = TerrainConfig::default();
    let mut other = config.clone();
    other.noise.seed = 4321;

    let a = field(&config);
    let b = field(&other);
    let differs = (0..32).any(|i| {
        let x = i as f32 * 13.7;
        a.height(x, -x * 0.5) != b.height(x, -x * 0.5)
    });
    assert!(differs);
}

#[test]
fn shared_edge_positions_match() {
    let config = TerrainConfig::default();
    let coords = CoordinateSystem::new(&config.chunk).unwrap();
    let field = field(&config);
    let n = coords.vertices_per_side();

    for (left, right) in [
        (ChunkCoord::new(0, 0), ChunkCoord::new(1, 0)),
        (ChunkCoord::new(-3, 7), ChunkCoord::new(-2, 7)),
    ] {
        for j in 0..=n {
            let v = j as f32 / n as f32;
            let a = coords.local_to_world(1.0, v, left);
            let b = coords.local_to_world(0.0, v, right);
            assert_eq!(a, b);
            assert_eq!(field.height(a.x, a.y).to_bits(), field.height(b.x, b.y).to_bits());
        }
    }
}

#[test]
fn neighbouring_meshes_have_no_seam() {
    let config = TerrainConfig::default();
    let builder = builder(&config);
    let size = config.chunk.chunk_size;

    let left = builder.build_chunk_mesh(ChunkCoord::new(0, 0)).unwrap();
    let right = builder.build_chunk_mesh(ChunkCoord::new(1, 0)).unwrap();

    let left_edge = edge_heights(&left.vertices, size);
    let right_edge = edge_heights(&right.vertices, size);
    assert_eq!(left_edge.len(), 51);
    assert_eq!(left_edge, right_edge);
}

#[test]
fn fractional_chunk_sizes_have_no_seam() {
    for (chunk_size, vertex_spacing) in [(10.3, 0.1), (7.7, 0.7), (24.9, 0.3), (24.5, 0.5)] {
        let mut config = TerrainConfig::default();
        config.chunk.chunk_size = chunk_size;
        config.chunk.vertex_spacing = vertex_spacing;
        let builder = builder(&config);
        let n = CoordinateSystem::new(&config.chunk).unwrap().vertices_per_side() as usize;

        for cx in [-7, -1, 0, 3, 40] {
            let left = builder.build_chunk_mesh(ChunkCoord::new(cx, 2)).unwrap();
            let right = builder.build_chunk_mesh(ChunkCoord::new(cx + 1, 2)).unwrap();

            let left_x = left.vertices.iter().map(|v| v.position[0]).fold(f32::MIN, f32::max);
            let right_x = right.vertices.iter().map(|v| v.position[0]).fold(f32::MAX, f32::min);
            assert_eq!(
                left_x.to_bits(),
                right_x.to_bits(),
                "edge x differs for size {chunk_size} at cx {cx}: {left_x} vs {right_x}"
            );

            let left_edge = edge_heights(&left.vertices, left_x);
            let right_edge = edge_heights(&right.vertices, right_x);
            assert_eq!(left_edge.len(), n + 1);
            assert_eq!(left_edge, right_edge, "heights differ for size {chunk_size} at cx {cx}");
        }
    }
}

#[test]
fn smooth_shading_keeps_seam_normals() {
    let mut config = TerrainConfig::default();
    config.terrain.shading = ShadingMode::Smooth;
    let builder = builder(&config);
    let size = config.chunk.chunk_size;

    let left = builder.build_chunk_mesh(ChunkCoord::new(2, -1)).unwrap();
    let right = builder.build_chunk_mesh(ChunkCoord::new(3, -1)).unwrap();

    let normals = |vertices: &[terrastream::Vertex], edge_x: f32| -> HashMap<u32, [u32; 3]> {
        vertices
            .iter()
            .filter(|v| v.position[0] == edge_x)
            .map(|v| (v.position[2].to_bits(), v.normal.map(f32::to_bits)))
            .collect()
    };
    let edge_x = 3.0 * size;
    assert_eq!(normals(&left.vertices, edge_x), normals(&right.vertices, edge_x));
}

#[test]
fn mesh_buffer_layout() {
    let config = TerrainConfig::default();
    let builder = builder(&config);
    let mesh = builder.build_chunk_mesh(ChunkCoord::new(-1, -1)).unwrap();

    assert_eq!(mesh.vertex_count(), 50 * 50 * 6);
    assert_eq!(mesh.as_floats().len(), mesh.vertex_count() * FLOATS_PER_VERTEX);
    assert_eq!(mesh.as_bytes().len(), mesh.vertex_count() * FLOATS_PER_VERTEX * 4);
    assert!(mesh.as_floats().iter().all(|f| f.is_finite()));
}

#[test]
fn heights_stay_within_scale() {
    let params = TerrainParams::default();
    let field = HeightField::new(params.clone(), NoiseParams::default(), BiomeThresholds::default()).unwrap();
    for i in -20..20 {
        for k in -20..20 {
            let h = field.height(i as f32 * 9.1, k as f32 * 7.3);
            assert!(h >= 0.0 && h <= params.height_scale, "height {h} out of range");
        }
    }
}
