//! RAW heightmap export for engine interchange.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::terrain::Heightmap;

/// Errors that can occur during RAW export.
#[derive(Error, Debug)]
pub enum RawExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid height range: min ({0}) >= max ({1})")]
    InvalidHeightRange(f32, f32),
}

/// RAW sample formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawFormat {
    /// 16-bit unsigned integer, little-endian.
    #[default]
    R16LittleEndian,
    /// 16-bit unsigned integer, big-endian.
    R16BigEndian,
    /// 32-bit float, little-endian (no normalization).
    R32Float,
}

/// Exports a heightmap as a headerless RAW file.
///
/// R16 formats normalize heights into `[min_height, max_height]`; R32
/// writes the float cells verbatim.
pub fn write_heightmap_raw(
    heightmap: &Heightmap,
    path: &Path,
    format: RawFormat,
    min_height: f32,
    max_height: f32,
) -> Result<(), RawExportError> {
    if format != RawFormat::R32Float && min_height >= max_height {
        return Err(RawExportError::InvalidHeightRange(min_height, max_height));
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let range = max_height - min_height;

    match format {
        RawFormat::R16LittleEndian => {
            for &h in heightmap.data() {
                let normalized = ((h - min_height) / range).clamp(0.0, 1.0);
                writer.write_all(&((normalized * 65535.0) as u16).to_le_bytes())?;
            }
        }
        RawFormat::R16BigEndian => {
            for &h in heightmap.data() {
                let normalized = ((h - min_height) / range).clamp(0.0, 1.0);
                writer.write_all(&((normalized * 65535.0) as u16).to_be_bytes())?;
            }
        }
        RawFormat::R32Float => {
            for &h in heightmap.data() {
                writer.write_all(&h.to_le_bytes())?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}

/// Expected file size in bytes for a RAW export.
pub fn expected_raw_size(width: usize, height: usize, format: RawFormat) -> u64 {
    let cells = (width as u64) * (height as u64);
    match format {
        RawFormat::R16LittleEndian | RawFormat::R16BigEndian => cells * 2,
        RawFormat::R32Float => cells * 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::generators;
    use tempfile::tempdir;

    #[test]
    fn test_write_r16() {
        let terrain = generators::cone(32, 32, 16.0, 16.0, 12.0, 10.0);
        let dir = tempdir().unwrap();
        let path = dir.path().join("frame.raw");

        write_heightmap_raw(&terrain, &path, RawFormat::R16LittleEndian, 0.0, 10.0).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert_eq!(
            metadata.len(),
            expected_raw_size(32, 32, RawFormat::R16LittleEndian)
        );
    }

    #[test]
    fn test_write_r32_round_trips_exact_values() {
        let mut terrain = Heightmap::new(2, 2);
        terrain.set(0, 0, -1.5);
        terrain.set(1, 0, 0.0);
        terrain.set(0, 1, 2.25);
        terrain.set(1, 1, 1e6);

        let dir = tempdir().unwrap();
        let path = dir.path().join("frame.raw");
        write_heightmap_raw(&terrain, &path, RawFormat::R32Float, 0.0, 0.0).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 16);
        let values: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(values, vec![-1.5, 0.0, 2.25, 1e6]);
    }

    #[test]
    fn test_rejects_empty_range_for_r16() {
        let terrain = generators::flat(4, 4, 0.0);
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.raw");
        assert!(matches!(
            write_heightmap_raw(&terrain, &path, RawFormat::R16LittleEndian, 1.0, 1.0),
            Err(RawExportError::InvalidHeightRange(_, _))
        ));
    }
}
