//! Top-level configuration passed to the streaming controller

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chunk::ChunkConfig;
use crate::core::Result;
use crate::streaming::StreamingConfig;
use crate::terrain::{BiomeThresholds, NoiseParams, TerrainParams};

/// Everything the terrain core needs, supplied at construction and on
/// reconfiguration. Missing JSON fields take their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub chunk: ChunkConfig,
    pub noise: NoiseParams,
    pub terrain: TerrainParams,
    pub biomes: BiomeThresholds,
    pub streaming: StreamingConfig,
}

impl TerrainConfig {
    /// Check every section; the first problem found is returned
    pub fn validate(&self) -> Result<()> {
        self.chunk.validate()?;
        self.noise.validate()?;
        self.terrain.validate()?;
        self.biomes.validate(self.terrain.water_threshold)?;
        self.streaming.validate()?;
        Ok(())
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: TerrainConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&text)?;
        log::info!("Loaded terrain config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Write as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Whether switching to `other` changes generated geometry or the
    /// generation queues, as opposed to only the streaming window and fades
    pub fn generation_differs(&self, other: &TerrainConfig) -> bool {
        self.chunk != other.chunk
            || self.noise != other.noise
            || self.terrain != other.terrain
            || self.biomes != other.biomes
            || self.streaming.water_level != other.streaming.water_level
            || self.streaming.queue_capacity != other.streaming.queue_capacity
            || self.streaming.idle_sleep_ms != other.streaming.idle_sleep_ms
    }
}
