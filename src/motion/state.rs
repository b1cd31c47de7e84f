use std::f64::consts::TAU;

use crate::foundation::core::{Point, Vec2};
use crate::foundation::math::Rng64;

/// Mutable per-session animation state.
///
/// `time` and `color_time` advance in lockstep, once per composited frame (warm-up frames
/// included), and are reset together on every (re)start.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    /// Top-left draw position of the sprite.
    pub pos: Point,
    /// Unit velocity used by the integrated modes.
    pub vel: Vec2,
    /// Frames since playback start.
    pub time: u64,
    /// Frames since playback start, for the palette phase.
    pub color_time: u64,
    /// Which of the two trail buffers is read this frame.
    pub ping_pong: bool,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            pos: Point::ZERO,
            vel: Vec2::new(1.2, 0.8),
            time: 0,
            color_time: 0,
            ping_pong: false,
        }
    }
}

impl AnimationState {
    /// Reset for a fresh playback run starting at `start`, drawing a new random heading.
    pub fn restart(&mut self, start: Point, rng: &mut Rng64) {
        let angle = rng.next_f64_01() * TAU;
        self.pos = start;
        self.vel = Vec2::new(angle.cos(), angle.sin());
        self.time = 0;
        self.color_time = 0;
        self.ping_pong = false;
    }

    /// Close out one composited frame.
    pub fn end_frame(&mut self) {
        self.ping_pong = !self.ping_pong;
        self.time += 1;
        self.color_time += 1;
    }
}
