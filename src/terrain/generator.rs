//! Height field built on the fractal noise

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::biome::{Biome, BiomeThresholds, Colorizer};
use super::mesh::ShadingMode;
use super::noise::{NoiseField, NoiseParams};
use crate::core::{Error, Result};

/// Parameters controlling terrain shape and meshing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub scale: f32,           // Horizontal scale (larger = smoother)
    pub height_scale: f32,    // Vertical scale (max height)
    pub water_threshold: f32, // Normalized height at or below which terrain is flat water
    pub shading: ShadingMode,
    pub flip_alternate_uvs: bool, // Mirror UVs on odd chunks to hide texture tiling
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            scale: 100.0,
            height_scale: 30.0,
            water_threshold: 0.45,
            shading: ShadingMode::Flat,
            flip_alternate_uvs: true,
        }
    }
}

impl TerrainParams {
    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(Error::config(format!("terrain scale must be positive, got {}", self.scale)));
        }
        if !self.height_scale.is_finite() || self.height_scale < 0.0 {
            return Err(Error::config(format!(
                "terrain height_scale must be non-negative, got {}",
                self.height_scale
            )));
        }
        if !(0.0..1.0).contains(&self.water_threshold) {
            return Err(Error::config(format!(
                "terrain water_threshold must be in [0, 1), got {}",
                self.water_threshold
            )));
        }
        Ok(())
    }
}

/// Pure height/color function of world XZ
#[derive(Clone, Debug)]
pub struct HeightField {
    params: TerrainParams,
    noise: NoiseField,
    colorizer: Colorizer,
}

impl HeightField {
    pub fn new(params: TerrainParams, noise: NoiseParams, biomes: BiomeThresholds) -> Result<Self> {
        params.validate()?;
        biomes.validate(params.water_threshold)?;
        let noise = NoiseField::new(noise)?;
        let colorizer = Colorizer::new(params.water_threshold, biomes);
        Ok(Self { params, noise, colorizer })
    }

    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    /// Fractal noise mapped to `[0, 1]`, before the shoreline remap
    pub fn normalized(&self, x: f32, z: f32) -> f32 {
        let n = self.noise.fractal(x / self.params.scale, z / self.params.scale);
        (0.5 + 0.5 * n).clamp(0.0, 1.0)
    }

    /// Flatten water to 0 and ease land up from the shoreline
    pub fn remap(&self, normalized: f32) -> f32 {
        let water = self.params.water_threshold;
        if normalized <= water {
            return 0.0;
        }
        let t = ((normalized - water) / (1.0 - water)).min(1.0);
        (1.0 - (std::f32::consts::PI * t).cos()) * 0.5
    }

    /// Terrain height at world position (x, z)
    pub fn height(&self, x: f32, z: f32) -> f32 {
        self.params.height_scale * self.remap(self.normalized(x, z))
    }

    /// Biome band at world position (x, z)
    pub fn biome(&self, x: f32, z: f32) -> Biome {
        self.colorizer.biome(self.normalized(x, z))
    }

    /// Biome color at world position (x, z)
    pub fn color(&self, x: f32, z: f32) -> [f32; 3] {
        self.colorizer.color(self.normalized(x, z))
    }

    /// Surface point at world position (x, z)
    pub fn position(&self, x: f32, z: f32) -> Vec3 {
        Vec3::new(x, self.height(x, z), z)
    }

    /// Smoothed normal from the 8 ring neighbours `spacing` apart.
    ///
    /// Sums the cross products of consecutive neighbour pairs around the
    /// centre, which avoids analytic derivatives of the noise.
    pub fn ring_normal(&self, x: f32, z: f32, spacing: f32) -> Vec3 {
        const RING: [(f32, f32); 8] = [
            (-1.0, -1.0),
            (0.0, -1.0),
            (1.0, -1.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
            (-1.0, 1.0),
            (-1.0, 0.0),
        ];

        let center = self.position(x, z);
        let ring = RING.map(|(dx, dz)| self.position(x + dx * spacing, z + dz * spacing) - center);

        let mut normal = Vec3::ZERO;
        for i in 0..RING.len() {
            let a = ring[i];
            let b = ring[(i + 1) % RING.len()];
            normal += b.cross(a);
        }
        normal.try_normalize().unwrap_or(Vec3::Y)
    }
}
