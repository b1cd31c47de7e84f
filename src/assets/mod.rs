//! Sprite sources: raster and SVG files, or rendered text, trimmed to their visible content.

/// Content bounds detection and background keying.
pub mod bounds;
/// Raster decoding, resampling and alpha conversion.
pub mod decode;
/// Sprite value type and the file/text loader.
pub mod sprite;
/// SVG parsing and rasterization.
pub mod svg;
/// Text-to-sprite rendering.
pub mod text;
