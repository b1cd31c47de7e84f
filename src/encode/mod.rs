//! Encoding sinks.
//!
//! Sinks consume captured frames in order and are fed by `AnimationSession` while recording.

/// `ffmpeg`-based video sinks (MP4 and alpha WebM via system `ffmpeg`).
pub mod ffmpeg;
/// PNG image-sequence sink.
pub mod png;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
