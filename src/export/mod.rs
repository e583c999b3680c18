//! Snapshot export for heightmap frames.

mod png;
mod raw;

pub use png::{write_heightmap_png, PngExportError, PngExportOptions};
pub use raw::{expected_raw_size, write_heightmap_raw, RawExportError, RawFormat};
