use std::f64::consts::TAU;

use crate::foundation::core::NOMINAL_FPS;
use crate::motion::mode::MotionMode;

/// Shortest cycle the cyclic modes accept, in seconds.
pub const MIN_CYCLE_SECS: f64 = 0.25;

/// Free-running phase rate of the non-cyclic modes, per frame.
const FREE_PHASE_PER_FRAME: f64 = 0.02;

/// Per-frame motion inputs. Values are assumed already sanitized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParams {
    /// Motion path.
    pub mode: MotionMode,
    /// Canvas width in pixels.
    pub width: f64,
    /// Canvas height in pixels.
    pub height: f64,
    /// Sprite width after content scaling.
    pub sprite_width: f64,
    /// Sprite height after content scaling.
    pub sprite_height: f64,
    /// Horizontal amplitude fraction in `[0, 1]`.
    pub amp_x: f64,
    /// Vertical amplitude fraction in `[0, 1]`.
    pub amp_y: f64,
    /// Global animation speed.
    pub speed: f64,
    /// Mode-specific speed multiplier.
    pub mode_speed: f64,
    /// Cycle duration of the cyclic modes, in seconds.
    pub mode_duration: f64,
    /// Snap the speed product to an integer so recorded loops close exactly.
    pub loop_mode: bool,
}

/// Geometry derived from [`MotionParams`] once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelBand {
    /// Centered X position.
    pub cx: f64,
    /// Centered Y position.
    pub cy: f64,
    /// Horizontal travel range, never negative.
    pub range_w: f64,
    /// Vertical travel range, never negative.
    pub range_h: f64,
    /// Left band edge.
    pub min_x: f64,
    /// Right band edge.
    pub max_x: f64,
    /// Top band edge.
    pub min_y: f64,
    /// Bottom band edge.
    pub max_y: f64,
    /// Horizontal radius available to orbit-like modes.
    pub max_rx: f64,
    /// Vertical radius available to orbit-like modes.
    pub max_ry: f64,
}

impl MotionParams {
    /// Travel band for the current canvas/sprite geometry.
    pub fn band(&self) -> TravelBand {
        let range_w = (self.width - self.sprite_width).max(0.0);
        let range_h = (self.height - self.sprite_height).max(0.0);
        let min_x = (1.0 - self.amp_x) * range_w / 2.0;
        let min_y = (1.0 - self.amp_y) * range_h / 2.0;
        TravelBand {
            cx: self.width / 2.0 - self.sprite_width / 2.0,
            cy: self.height / 2.0 - self.sprite_height / 2.0,
            range_w,
            range_h,
            min_x,
            max_x: min_x + range_w * self.amp_x,
            min_y,
            max_y: min_y + range_h * self.amp_y,
            max_rx: (range_w * 0.45 * self.amp_x).max(0.0),
            max_ry: (range_h * 0.45 * self.amp_y).max(0.0),
        }
    }

    /// `speed * mode_speed`, rounded to a whole number of cycles (at least one) in loop mode.
    pub fn effective_speed_product(&self) -> f64 {
        let product = self.speed * self.mode_speed;
        if self.loop_mode {
            product.round().max(1.0)
        } else {
            product
        }
    }

    /// Cycle length in seconds used by the cyclic modes.
    pub fn cycle_secs(&self) -> f64 {
        self.mode_duration.max(MIN_CYCLE_SECS)
    }

    /// Path phase for frame `time`.
    pub fn phase(&self, time: u64) -> f64 {
        let time = time as f64;
        if self.mode.is_cyclic() {
            let period_frames = self.cycle_secs() * NOMINAL_FPS.as_f64();
            time / period_frames * TAU * self.effective_speed_product()
        } else {
            time * FREE_PHASE_PER_FRAME * self.speed * self.mode_speed
        }
    }
}
