//! Fractal noise fields normalized to `[0, 1)`.

use noise::{NoiseFn, Perlin, Seedable};
use serde::{Deserialize, Serialize};

/// Largest value a normalized sample may take
const MAX_NORMALIZED: f32 = 1.0 - 1e-6;

/// Parameters for fractal (fBm) noise
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Cells per noise unit (higher = larger features)
    pub scale: f64,
    pub octaves: u32,
    /// Amplitude multiplier per octave
    pub persistence: f64,
    /// Frequency multiplier per octave
    pub lacunarity: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            scale: 24.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

/// Fractal Brownian motion over Perlin noise, roughly in [-1, 1].
fn fbm(noise: &Perlin, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves.max(1) {
        total += amplitude * noise.get([x * frequency, y * frequency]);
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    total / max_value
}

/// Generate a row-major noise map with every value in `[0, 1)`.
///
/// Values are min/max normalized over the map, so the lowest cell is 0.0 and
/// the highest sits just below 1.0. A constant field maps to all zeros.
pub fn generate_noise_map(width: usize, height: usize, seed: u64, params: &NoiseParams) -> Vec<f32> {
    let perlin = Perlin::new(0).set_seed(seed as u32 ^ (seed >> 32) as u32);
    let scale = if params.scale <= 0.0 { 1.0 } else { params.scale };

    // Offset so neighboring seeds don't sample the same lattice origin
    let offset = (seed % 10_000) as f64 * 0.173;

    let raw: Vec<f64> = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .map(|(x, y)| {
            let nx = x as f64 / scale + offset;
            let ny = y as f64 / scale + offset;
            fbm(&perlin, nx, ny, params.octaves, params.persistence, params.lacunarity)
        })
        .collect();

    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    raw.into_iter()
        .map(|v| {
            if range <= f64::EPSILON {
                0.0
            } else {
                (((v - min) / range) as f32).min(MAX_NORMALIZED)
            }
        })
        .collect()
}
