//! Procedural sprite motion: per-frame position update for every [`MotionMode`](mode::MotionMode).

/// The position update state machine.
pub mod advance;
/// Motion mode enumeration.
pub mod mode;
/// Per-frame motion parameters and derived travel band.
pub mod params;
/// Mutable animation state.
pub mod state;
