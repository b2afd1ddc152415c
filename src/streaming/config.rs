//! Streaming window, fade and queue settings

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Largest render distance accepted, in chunks
pub const MAX_RENDER_DISTANCE: u32 = 128;

/// Configuration for the streaming controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Chebyshev radius (chunks) of the terrain window
    pub render_distance: u32,
    /// Chebyshev radius (chunks) of the water-plane window
    pub water_render_distance: u32,
    /// Fade-in duration after a mesh arrives
    pub fade_in_ms: u64,
    /// Fade-out duration before a chunk is released
    pub fade_out_ms: u64,
    /// Maximum queued generation requests per layer
    pub queue_capacity: usize,
    /// Worker sleep when its queue is empty
    pub idle_sleep_ms: u64,
    /// World height of the water planes
    pub water_level: f32,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            render_distance: 8,
            water_render_distance: 4,
            fade_in_ms: 2000,
            fade_out_ms: 2000,
            queue_capacity: 100,
            idle_sleep_ms: 16,
            water_level: 0.05,
        }
    }
}

impl StreamingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.render_distance > MAX_RENDER_DISTANCE {
            return Err(Error::config(format!(
                "render_distance {} exceeds the maximum of {MAX_RENDER_DISTANCE}",
                self.render_distance
            )));
        }
        if self.water_render_distance > MAX_RENDER_DISTANCE {
            return Err(Error::config(format!(
                "water_render_distance {} exceeds the maximum of {MAX_RENDER_DISTANCE}",
                self.water_render_distance
            )));
        }
        if self.queue_capacity == 0 {
            return Err(Error::config("queue_capacity must be at least 1"));
        }
        if !self.water_level.is_finite() {
            return Err(Error::config("water_level must be finite"));
        }
        Ok(())
    }

    pub fn fade_in(&self) -> Duration {
        Duration::from_millis(self.fade_in_ms)
    }

    pub fn fade_out(&self) -> Duration {
        Duration::from_millis(self.fade_out_ms)
    }

    pub fn idle_sleep(&self) -> Duration {
        Duration::from_millis(self.idle_sleep_ms)
    }
}
