//! Recording schedules: seamless loops and fixed-duration captures.

/// Warm-up and capture bookkeeping.
pub mod scheduler;
