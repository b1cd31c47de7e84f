//! Cyclic color palettes used to tint the trail.

/// Hex parsing and the [`Rgb8`](color::Rgb8) stop type.
pub mod color;
/// Built-in palette table.
pub mod presets;
/// Phase-to-color gradient sampling.
pub mod sampler;
