//! Multi-octave fractal Brownian motion layered over gradient noise.

use serde::{Deserialize, Serialize};

use super::PerlinNoise;

/// Octave layering parameters for fBm synthesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FbmParams {
    /// Number of noise octaves (1-16).
    pub octaves: u32,
    /// Base spatial frequency.
    pub frequency: f32,
    /// Output amplitude of the composed signal.
    pub amplitude: f32,
    /// Amplitude decay per octave.
    pub persistence: f32,
    /// Frequency multiplier per octave.
    pub lacunarity: f32,
}

impl Default for FbmParams {
    fn default() -> Self {
        Self {
            octaves: 6,
            frequency: 0.01,
            amplitude: 50.0,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

/// Samples fBm at a single point.
///
/// Octave `i` contributes `noise(p * frequency * lacunarity^i) *
/// persistence^i`; the sum is normalized by the accumulated amplitude and
/// scaled back by the base amplitude, keeping the output in roughly
/// `[-amplitude, amplitude]` regardless of octave count.
pub fn fbm(perlin: &PerlinNoise, x: f32, y: f32, params: &FbmParams) -> f32 {
    let mut total = 0.0f32;
    let mut current_amplitude = params.amplitude;
    let mut current_frequency = params.frequency;
    let mut max_value = 0.0f32;

    for _ in 0..params.octaves {
        total += perlin.noise(x * current_frequency, y * current_frequency) * current_amplitude;
        max_value += current_amplitude;
        current_frequency *= params.lacunarity;
        current_amplitude *= params.persistence;
    }

    total / max_value * params.amplitude
}
