//! Lattice-gradient noise with a fixed, seeded gradient table
//!
//! Gradients live in a table built once from the seed. Lattice corners
//! pick a gradient through a pure integer hash of their cell coordinates,
//! so any two callers sampling the same point get bit-identical results
//! regardless of which chunk they are building.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result, Vec2};

/// Parameters for the noise table and its fractal sum
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    pub seed: u64,
    pub table_size: usize, // Number of gradients in the lookup table
    pub octaves: u32,      // Fractal octaves (detail levels)
    pub persistence: f32,  // Amplitude multiplier per octave (0.5 typical)
    pub lacunarity: f32,   // Frequency multiplier per octave (2.0 typical)
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            seed: 1230,
            table_size: 1024,
            octaves: 5,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl NoiseParams {
    pub fn validate(&self) -> Result<()> {
        if self.table_size == 0 {
            return Err(Error::config("noise table_size must be at least 1"));
        }
        if self.octaves == 0 {
            return Err(Error::config("noise octaves must be at least 1"));
        }
        if !self.persistence.is_finite() || self.persistence <= 0.0 {
            return Err(Error::config(format!(
                "noise persistence must be positive, got {}",
                self.persistence
            )));
        }
        if !self.lacunarity.is_finite() || self.lacunarity <= 0.0 {
            return Err(Error::config(format!(
                "noise lacunarity must be positive, got {}",
                self.lacunarity
            )));
        }
        Ok(())
    }
}

/// Deterministic 2D noise field. Read-only after construction.
#[derive(Clone, Debug)]
pub struct NoiseField {
    gradients: Vec<Vec2>,
    params: NoiseParams,
}

impl NoiseField {
    /// Build the gradient table from `params.seed`
    pub fn new(params: NoiseParams) -> Result<Self> {
        params.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
        let gradients = (0..params.table_size)
            .map(|_| Vec2::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0)))
            .collect();

        Ok(Self { gradients, params })
    }

    pub fn params(&self) -> &NoiseParams {
        &self.params
    }

    /// Gradient for the lattice corner `(ix, iy)`
    fn gradient(&self, ix: i32, iy: i32) -> Vec2 {
        let index = lattice_hash(ix, iy) as usize % self.gradients.len();
        self.gradients[index]
    }

    /// Single-octave noise at `(x, y)`, roughly in `[-1, 1]`
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let x0 = x.floor();
        let y0 = y.floor();
        let ix = x0 as i32;
        let iy = y0 as i32;

        let dx = x - x0;
        let dy = y - y0;

        let a = self.gradient(ix, iy).dot(Vec2::new(dx, dy));
        let b = self.gradient(ix.wrapping_add(1), iy).dot(Vec2::new(dx - 1.0, dy));
        let c = self.gradient(ix, iy.wrapping_add(1)).dot(Vec2::new(dx, dy - 1.0));
        let d = self
            .gradient(ix.wrapping_add(1), iy.wrapping_add(1))
            .dot(Vec2::new(dx - 1.0, dy - 1.0));

        let top = interpolate(a, b, dx);
        let bottom = interpolate(c, d, dx);
        interpolate(top, bottom, dy)
    }

    /// Octave sum normalized by total amplitude
    pub fn fractal_sample(
        &self,
        x: f32,
        y: f32,
        octaves: u32,
        persistence: f32,
        lacunarity: f32,
    ) -> f32 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves {
            total += self.sample(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        if max_amplitude > 0.0 {
            total / max_amplitude
        } else {
            0.0
        }
    }

    /// Fractal sample using the configured octave parameters
    pub fn fractal(&self, x: f32, y: f32) -> f32 {
        self.fractal_sample(
            x,
            y,
            self.params.octaves,
            self.params.persistence,
            self.params.lacunarity,
        )
    }
}

/// Smoothstep-eased blend from `a` to `b`
fn interpolate(a: f32, b: f32, t: f32) -> f32 {
    let eased = t * t * (3.0 - 2.0 * t);
    a + eased * (b - a)
}

/// Integer mix of a lattice coordinate; depends on nothing but its inputs
fn lattice_hash(ix: i32, iy: i32) -> u32 {
    let mut h = (ix as u32).wrapping_mul(0x8DA6_B343) ^ (iy as u32).wrapping_mul(0xD816_3841);
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^= h >> 12;
    h = h.wrapping_mul(0x297A_2D39);
    h ^ (h >> 15)
}
