use std::f64::consts::{FRAC_PI_2, TAU};

use crate::foundation::core::Point;
use crate::motion::mode::MotionMode;
use crate::motion::params::{MotionParams, TravelBand};
use crate::motion::state::AnimationState;

/// Update `state.pos` for frame `state.time`.
///
/// Closed-form modes overwrite the position from the path phase; `bounce` and `drift` integrate
/// `state.vel` and may flip or wrap it. Degenerate geometry (sprite as large as the canvas)
/// collapses the band to a point rather than failing.
pub fn advance(state: &mut AnimationState, params: &MotionParams) {
    let band = params.band();
    let t = params.phase(state.time);

    match params.mode {
        MotionMode::Static => {
            state.pos = Point::new(
                (params.width - params.sprite_width) / 2.0,
                (params.height - params.sprite_height) / 2.0,
            );
        }
        MotionMode::Bounce => bounce(state, params, &band),
        MotionMode::Drift => drift(state, params, &band),
        MotionMode::Orbit => state.pos = orbit(&band, params, t),
        MotionMode::Figure8 => state.pos = figure8(&band, t),
        MotionMode::Lissajous => state.pos = lissajous(&band, params.loop_mode, t),
        MotionMode::Spiral => state.pos = spiral(&band, params.loop_mode, t),
        MotionMode::Zigzag => state.pos = zigzag(&band, params.loop_mode, t),
    }
}

fn bounce(state: &mut AnimationState, params: &MotionParams, band: &TravelBand) {
    let k = params.mode_speed * params.speed;
    state.pos.x += state.vel.x * k;
    state.pos.y += state.vel.y * k;

    if state.pos.x <= band.min_x || state.pos.x >= band.max_x {
        state.vel.x = -state.vel.x;
        state.pos.x = state.pos.x.min(band.max_x).max(band.min_x);
    }
    if state.pos.y <= band.min_y || state.pos.y >= band.max_y {
        state.vel.y = -state.vel.y;
        state.pos.y = state.pos.y.min(band.max_y).max(band.min_y);
    }
}

fn drift(state: &mut AnimationState, params: &MotionParams, band: &TravelBand) {
    let k = params.mode_speed * params.speed;
    state.pos.x += state.vel.x * k * 0.8;
    state.pos.y += state.vel.y * k * 0.3;

    if state.pos.x > band.max_x {
        state.pos.x = band.min_x;
    }
    if state.pos.x < band.min_x {
        state.pos.x = band.max_x;
    }
    if state.pos.y > band.max_y {
        state.pos.y = band.min_y;
    }
    if state.pos.y < band.min_y {
        state.pos.y = band.max_y;
    }
}

fn orbit(band: &TravelBand, params: &MotionParams, t: f64) -> Point {
    let rx = band.range_w * 0.35 * params.amp_x;
    let ry = band.range_h * 0.35 * params.amp_y;
    Point::new(band.cx + t.cos() * rx, band.cy + t.sin() * ry)
}

fn figure8(band: &TravelBand, t: f64) -> Point {
    Point::new(
        band.cx + t.sin() * band.max_rx * 0.9,
        band.cy + (t * 2.0).sin() * band.max_ry * 0.55,
    )
}

fn lissajous(band: &TravelBand, loop_mode: bool, t: f64) -> Point {
    // Integer ratios close the curve within one cycle.
    let (lx, ly) = if loop_mode { (2.0, 3.0) } else { (1.7, 2.3) };
    Point::new(
        band.cx + (t * lx + FRAC_PI_2).sin() * band.max_rx * 0.95,
        band.cy + (t * ly).sin() * band.max_ry * 0.95,
    )
}

fn spiral(band: &TravelBand, loop_mode: bool, t: f64) -> Point {
    let (spiral_mul, orbit_mul) = if loop_mode { (1.0, 1.0) } else { (0.55, 1.2) };
    let blend = 0.15 + 0.85 * (((t * spiral_mul).sin() + 1.0) / 2.0);
    let rx = band.max_rx * blend;
    let ry = band.max_ry * blend;
    Point::new(
        band.cx + (t * orbit_mul).cos() * rx,
        band.cy + (t * orbit_mul).sin() * ry,
    )
}

fn zigzag(band: &TravelBand, loop_mode: bool, t: f64) -> Point {
    let y_mul = if loop_mode { 1.0 } else { 1.4 };
    Point::new(
        band.min_x + (band.max_x - band.min_x) * triangle(t),
        band.cy + (t * y_mul).sin() * band.max_ry * 0.65,
    )
}

/// Symmetric triangle wave over one `2π` period: 0 at phase 0, 1 at `π`.
pub(crate) fn triangle(t: f64) -> f64 {
    let norm = ((t / TAU) % 1.0 + 1.0) % 1.0;
    if norm < 0.5 {
        norm * 2.0
    } else {
        (1.0 - norm) * 2.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/advance.rs"]
mod tests;
