//! Height-banded biome coloring
//!
//! Bands are flat: a sample takes its band's color with no blending
//! across thresholds.

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Biome bands, lowest to highest
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Biome {
    Water,
    Sand,
    Grass,
    Rock,
    Snow,
}

impl Biome {
    /// Fixed RGB for this band
    pub fn color(&self) -> [f32; 3] {
        match self {
            Biome::Water => [0.12, 0.31, 0.59],
            Biome::Sand => [0.93, 0.84, 0.69],
            Biome::Grass => [0.35, 0.62, 0.27],
            Biome::Rock => [0.47, 0.45, 0.43],
            Biome::Snow => [0.94, 0.97, 1.0],
        }
    }
}

/// What the highest band is covered with
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MountainStyle {
    #[default]
    Snow,
    Rock,
    Grass,
}

/// Upper bounds of each band on the normalized `[0, 1]` height.
///
/// Water ends at the terrain water threshold; snow takes everything above
/// `rock`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeThresholds {
    pub sand: f32,
    pub grass: f32,
    pub rock: f32,
    pub mountain: MountainStyle,
}

impl Default for BiomeThresholds {
    fn default() -> Self {
        Self {
            sand: 0.47,
            grass: 0.6,
            rock: 0.7,
            mountain: MountainStyle::Snow,
        }
    }
}

impl BiomeThresholds {
    /// Thresholds must be ordered above the water line and within `[0, 1]`
    pub fn validate(&self, water_threshold: f32) -> Result<()> {
        let ordered = water_threshold <= self.sand
            && self.sand <= self.grass
            && self.grass <= self.rock
            && self.rock <= 1.0;
        if !ordered {
            return Err(Error::config(format!(
                "biome thresholds must satisfy water ({}) <= sand ({}) <= grass ({}) <= rock ({}) <= 1",
                water_threshold, self.sand, self.grass, self.rock
            )));
        }
        Ok(())
    }
}

/// Maps normalized height to a biome band
#[derive(Clone, Debug)]
pub struct Colorizer {
    water: f32,
    thresholds: BiomeThresholds,
}

impl Colorizer {
    pub fn new(water_threshold: f32, thresholds: BiomeThresholds) -> Self {
        Self {
            water: water_threshold,
            thresholds,
        }
    }

    /// Band for a normalized height
    pub fn biome(&self, normalized: f32) -> Biome {
        let t = &self.thresholds;
        if normalized <= self.water {
            Biome::Water
        } else if normalized < t.sand {
            Biome::Sand
        } else if normalized < t.grass {
            Biome::Grass
        } else if normalized < t.rock {
            Biome::Rock
        } else {
            match t.mountain {
                MountainStyle::Snow => Biome::Snow,
                MountainStyle::Rock => Biome::Rock,
                MountainStyle::Grass => Biome::Grass,
            }
        }
    }

    /// RGB for a normalized height
    pub fn color(&self, normalized: f32) -> [f32; 3] {
        self.biome(normalized).color()
    }
}
