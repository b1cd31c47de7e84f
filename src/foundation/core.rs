use crate::foundation::error::{TrailError, TrailResult};

pub use kurbo::{Point, Vec2};

/// Frame rate all second-denominated parameters are measured against.
pub const NOMINAL_FPS: Fps = Fps { num: 60, den: 1 };

/// 0-based frame counter since playback (or capture) start.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
    serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> TrailResult<Self> {
        if den == 0 {
            return Err(TrailError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(TrailError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Convert a frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }

    /// Convert seconds to the nearest whole frame count.
    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }

    /// One frame interval, rounded up to whole nanoseconds.
    pub fn frame_duration(self) -> std::time::Duration {
        let num = u64::from(self.num.max(1));
        std::time::Duration::from_nanos((1_000_000_000 * u64::from(self.den)).div_ceil(num))
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Construct a canvas of `width x height`.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Byte length of a tightly packed RGBA8 surface of this size.
    pub fn rgba_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }

    /// Top-left position that centers a `sprite_w x sprite_h` box.
    pub fn centered(self, sprite_w: f64, sprite_h: f64) -> Point {
        Point::new(
            (f64::from(self.width) - sprite_w) / 2.0,
            (f64::from(self.height) - sprite_h) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_rejects_zero_parts() {
        assert!(Fps::new(0, 1).is_err());
        assert!(Fps::new(60, 0).is_err());
        assert_eq!(Fps::new(60, 1).unwrap(), NOMINAL_FPS);
    }

    #[test]
    fn nominal_fps_conversions() {
        assert_eq!(NOMINAL_FPS.secs_to_frames_round(8.0), 480);
        assert!((NOMINAL_FPS.frames_to_secs(90) - 1.5).abs() < 1e-12);
        assert_eq!(NOMINAL_FPS.frame_duration().as_nanos(), 16_666_667);
        assert!(NOMINAL_FPS.frame_duration() * 300 >= std::time::Duration::from_secs(5));
    }

    #[test]
    fn centered_sprite_position() {
        let c = Canvas::new(800, 600);
        assert_eq!(c.centered(100.0, 100.0), Point::new(350.0, 250.0));
        assert_eq!(c.rgba_len(), 800 * 600 * 4);
    }
}
