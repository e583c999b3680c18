//! Frame-0 terrain generators.
//!
//! Each generator is a pure per-cell function over the grid, parallelized
//! across cells with rayon. Noise-based generators validate their
//! parameters up front and surface violations as [`GeneratorError`].

use rayon::prelude::*;
use thiserror::Error;

use crate::noise::{fbm, FbmParams, PerlinNoise};
use crate::terrain::Heightmap;

/// Parameter validation errors for terrain generation.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Width and height must be greater than 0")]
    EmptyGrid,
    #[error("Octaves must be between 1 and 16, got {0}")]
    OctavesOutOfRange(u32),
    #[error("{name} must be a strictly positive finite number, got {value}")]
    InvalidParameter { name: &'static str, value: f32 },
}

fn check_positive_finite(name: &'static str, value: f32) -> Result<(), GeneratorError> {
    if value <= 0.0 || !value.is_finite() {
        return Err(GeneratorError::InvalidParameter { name, value });
    }
    Ok(())
}

fn check_dimensions(width: usize, height: usize) -> Result<(), GeneratorError> {
    if width == 0 || height == 0 {
        return Err(GeneratorError::EmptyGrid);
    }
    Ok(())
}

/// Fills a heightmap cell-by-cell from a (x, y) -> elevation function.
fn fill_per_cell<F>(width: usize, height: usize, f: F) -> Heightmap
where
    F: Fn(usize, usize) -> f32 + Sync,
{
    let mut map = Heightmap::new(width, height);
    map.data_mut()
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, cell)| {
            let x = i % width;
            let y = i / width;
            *cell = f(x, y);
        });
    map
}

/// Constant-elevation terrain.
pub fn flat(width: usize, height: usize, elevation: f32) -> Heightmap {
    let mut map = Heightmap::new(width, height);
    map.fill(elevation);
    map
}

/// Hemisphere bump: `sqrt(r^2 - d^2)` inside the radius, 0 outside.
pub fn semi_sphere(width: usize, height: usize, cx: f32, cy: f32, radius: f32) -> Heightmap {
    let radius_sq = radius * radius;
    fill_per_cell(width, height, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let dist_sq = dx * dx + dy * dy;
        if dist_sq <= radius_sq {
            (radius_sq - dist_sq).sqrt()
        } else {
            0.0
        }
    })
}

/// Linear cone: `peak * (1 - d/r)` inside the radius, 0 outside.
pub fn cone(width: usize, height: usize, cx: f32, cy: f32, radius: f32, peak: f32) -> Heightmap {
    fill_per_cell(width, height, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist <= radius {
            peak * (1.0 - dist / radius)
        } else {
            0.0
        }
    })
}

/// Single-octave Perlin terrain: `amplitude * noise(x * frequency, y * frequency)`.
pub fn perlin(
    width: usize,
    height: usize,
    seed: u32,
    frequency: f32,
    amplitude: f32,
) -> Result<Heightmap, GeneratorError> {
    check_dimensions(width, height)?;
    check_positive_finite("Frequency", frequency)?;
    if !amplitude.is_finite() {
        return Err(GeneratorError::InvalidParameter {
            name: "Amplitude",
            value: amplitude,
        });
    }

    let noise = PerlinNoise::new(seed);
    Ok(fill_per_cell(width, height, |x, y| {
        noise.noise(x as f32 * frequency, y as f32 * frequency) * amplitude
    }))
}

/// Fractal Brownian motion terrain.
pub fn fractal(
    width: usize,
    height: usize,
    seed: u32,
    params: &FbmParams,
) -> Result<Heightmap, GeneratorError> {
    check_dimensions(width, height)?;
    if params.octaves < 1 || params.octaves > 16 {
        return Err(GeneratorError::OctavesOutOfRange(params.octaves));
    }
    check_positive_finite("Frequency", params.frequency)?;
    check_positive_finite("Amplitude", params.amplitude)?;
    check_positive_finite("Persistence", params.persistence)?;
    check_positive_finite("Lacunarity", params.lacunarity)?;

    let noise = PerlinNoise::new(seed);
    Ok(fill_per_cell(width, height, |x, y| {
        fbm(&noise, x as f32, y as f32, params)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat() {
        let map = flat(16, 8, 5.0);
        assert_eq!(map.len(), 128);
        assert!(map.data().iter().all(|&v| v == 5.0));
    }

    #[test]
    fn test_semi_sphere_profile() {
        let map = semi_sphere(256, 256, 128.0, 128.0, 100.0);
        assert_eq!(map.at(128, 128), 100.0);
        assert_eq!(map.at(0, 0), 0.0);
        // 50 cells off-center: sqrt(100^2 - 50^2) = sqrt(7500)
        let expected = 7500.0f32.sqrt();
        assert!((map.at(178, 128) - expected).abs() < 1e-3);
    }

    #[test]
    fn test_cone_profile() {
        let map = cone(100, 100, 50.0, 50.0, 40.0, 80.0);
        assert_eq!(map.at(50, 50), 80.0);
        assert!((map.at(70, 50) - 40.0).abs() < 1e-4);
        assert_eq!(map.at(90, 50), 0.0);
    }

    #[test]
    fn test_perlin_reproducible() {
        let a = perlin(64, 64, 42, 0.05, 10.0).unwrap();
        let b = perlin(64, 64, 42, 0.05, 10.0).unwrap();
        assert_eq!(a.data(), b.data());
        assert!(a.data().iter().any(|&v| v != 0.0));
    }

    #[test]
    fn test_perlin_rejects_bad_frequency() {
        assert!(perlin(64, 64, 1, 0.0, 10.0).is_err());
        assert!(perlin(64, 64, 1, f32::NAN, 10.0).is_err());
        assert!(perlin(64, 64, 1, f32::INFINITY, 10.0).is_err());
    }

    #[test]
    fn test_fractal_rejects_zero_dimensions() {
        let params = FbmParams::default();
        assert!(matches!(
            fractal(0, 64, 1, &params),
            Err(GeneratorError::EmptyGrid)
        ));
    }

    #[test]
    fn test_fractal_rejects_octaves_out_of_range() {
        let params = FbmParams {
            octaves: 17,
            ..Default::default()
        };
        assert!(matches!(
            fractal(32, 32, 1, &params),
            Err(GeneratorError::OctavesOutOfRange(17))
        ));
        let params = FbmParams {
            octaves: 0,
            ..Default::default()
        };
        assert!(fractal(32, 32, 1, &params).is_err());
    }

    #[test]
    fn test_fractal_rejects_nonpositive_parameters() {
        for (name, params) in [
            (
                "persistence",
                FbmParams {
                    persistence: 0.0,
                    ..Default::default()
                },
            ),
            (
                "lacunarity",
                FbmParams {
                    lacunarity: -2.0,
                    ..Default::default()
                },
            ),
            (
                "amplitude",
                FbmParams {
                    amplitude: f32::NAN,
                    ..Default::default()
                },
            ),
        ] {
            assert!(fractal(32, 32, 1, &params).is_err(), "{name} should fail");
        }
    }

    #[test]
    fn test_fractal_reproducible_and_bounded() {
        let params = FbmParams {
            amplitude: 50.0,
            ..Default::default()
        };
        let a = fractal(64, 64, 12345, &params).unwrap();
        let b = fractal(64, 64, 12345, &params).unwrap();
        assert_eq!(a.data(), b.data());
        assert!(a.data().iter().all(|&v| v.abs() <= 75.0));
    }
}
