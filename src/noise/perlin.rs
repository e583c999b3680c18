//! Classic 2D gradient noise with a seeded permutation table.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Deterministic 2D gradient noise.
///
/// A 256-entry permutation table is shuffled from the seed and duplicated to
/// 512 entries so corner hashing never needs a modulo. The same seed always
/// reproduces the same table, so `noise(x, y)` is bitwise reproducible
/// across runs. The lattice repeats with period 256 along both axes.
#[derive(Debug, Clone)]
pub struct PerlinNoise {
    p: [u8; 512],
}

impl PerlinNoise {
    /// Builds the permutation table from a 32-bit seed.
    pub fn new(seed: u32) -> Self {
        let mut permutation: [u8; 256] = core::array::from_fn(|i| i as u8);
        let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);
        permutation.shuffle(&mut rng);

        let mut p = [0u8; 512];
        for i in 0..256 {
            p[i] = permutation[i];
            p[i + 256] = permutation[i];
        }
        Self { p }
    }

    #[inline]
    fn hash(&self, ix: i32, iy: i32) -> u8 {
        self.p[self.p[(ix & 255) as usize] as usize + (iy & 255) as usize]
    }

    /// Quintic fade curve `6t^5 - 15t^4 + 10t^3`.
    ///
    /// Zero first and second derivatives at t=0 and t=1, which removes
    /// lattice artifacts from the interpolation.
    #[inline]
    pub fn fade(t: f32) -> f32 {
        t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
    }

    #[inline]
    fn lerp(t: f32, a: f32, b: f32) -> f32 {
        a + t * (b - a)
    }

    /// Dot product of the corner gradient with the offset (dx, dy).
    ///
    /// The hash selects one of 8 fixed gradients: the four diagonals and the
    /// four cardinal directions.
    fn grad(&self, ix: i32, iy: i32, dx: f32, dy: f32) -> f32 {
        match self.hash(ix, iy) & 7 {
            0 => dx + dy,
            1 => dx - dy,
            2 => -dx + dy,
            3 => -dx - dy,
            4 => dx,
            5 => -dx,
            6 => dy,
            _ => -dy,
        }
    }

    /// Noise value at (x, y), centered near zero and typically within ±1.
    pub fn noise(&self, x: f32, y: f32) -> f32 {
        let ix0 = x.floor() as i32;
        let iy0 = y.floor() as i32;
        let ix1 = ix0 + 1;
        let iy1 = iy0 + 1;

        let fx = x - ix0 as f32;
        let fy = y - iy0 as f32;

        let u = Self::fade(fx);
        let v = Self::fade(fy);

        let g00 = self.grad(ix0, iy0, fx, fy);
        let g10 = self.grad(ix1, iy0, fx - 1.0, fy);
        let g01 = self.grad(ix0, iy1, fx, fy - 1.0);
        let g11 = self.grad(ix1, iy1, fx - 1.0, fy - 1.0);

        let x1 = Self::lerp(u, g00, g10);
        let x2 = Self::lerp(u, g01, g11);
        Self::lerp(v, x1, x2)
    }
}
