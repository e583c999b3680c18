//! Seeded gradient noise for terrain synthesis.

mod perlin;
mod fractal;

pub use fractal::{fbm, FbmParams};
pub use perlin::PerlinNoise;
