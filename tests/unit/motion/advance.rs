use super::*;
use crate::foundation::core::{NOMINAL_FPS, Vec2};
use crate::motion::mode::MotionMode;

fn params(mode: MotionMode) -> MotionParams {
    MotionParams {
        mode,
        width: 800.0,
        height: 600.0,
        sprite_width: 100.0,
        sprite_height: 100.0,
        amp_x: 0.9,
        amp_y: 0.9,
        speed: 1.0,
        mode_speed: 2.0,
        mode_duration: 8.0,
        loop_mode: false,
    }
}

fn at(params: &MotionParams, time: u64) -> Point {
    let mut state = AnimationState {
        time,
        ..AnimationState::default()
    };
    advance(&mut state, params);
    state.pos
}

fn assert_close(a: Point, b: Point, tol: f64) {
    assert!(
        (a.x - b.x).abs() <= tol && (a.y - b.y).abs() <= tol,
        "{a:?} != {b:?} (tol {tol})"
    );
}

#[test]
fn static_mode_centers_sprite_every_frame() {
    let mut p = params(MotionMode::Static);
    p.amp_x = 0.1;
    p.amp_y = 0.3;
    let mut state = AnimationState::default();
    for _ in 0..10 {
        advance(&mut state, &p);
        assert_eq!(state.pos, Point::new(350.0, 250.0));
        state.end_frame();
    }
}

#[test]
fn unknown_mode_name_centers_sprite() {
    let p = params(MotionMode::from_name("teleport"));
    assert_eq!(at(&p, 17), Point::new(350.0, 250.0));
}

#[test]
fn bounce_stays_inside_band() {
    for (i, heading) in [0.3_f64, 1.1, 2.0, 2.9, 4.0, 5.5].into_iter().enumerate() {
        let mut p = params(MotionMode::Bounce);
        p.mode_speed = 1.0 + i as f64;
        p.amp_x = 0.4;
        let band = p.band();
        let mut state = AnimationState {
            pos: Point::new(band.cx, band.cy),
            vel: Vec2::new(heading.cos(), heading.sin()),
            ..AnimationState::default()
        };
        for _ in 0..5_000 {
            advance(&mut state, &p);
            assert!(state.pos.x >= band.min_x && state.pos.x <= band.max_x);
            assert!(state.pos.y >= band.min_y && state.pos.y <= band.max_y);
            state.end_frame();
        }
    }
}

#[test]
fn bounce_reflects_velocity_at_edge() {
    let p = params(MotionMode::Bounce);
    let band = p.band();
    let mut state = AnimationState {
        pos: Point::new(band.max_x - 1.0, band.cy),
        vel: Vec2::new(1.0, 0.0),
        ..AnimationState::default()
    };
    advance(&mut state, &p);
    assert_eq!(state.pos.x, band.max_x);
    assert_eq!(state.vel.x, -1.0);
}

#[test]
fn drift_wraps_to_opposite_edge() {
    let p = params(MotionMode::Drift);
    let band = p.band();
    let mut state = AnimationState {
        pos: Point::new(band.max_x - 0.5, band.cy),
        vel: Vec2::new(1.0, 0.0),
        ..AnimationState::default()
    };
    advance(&mut state, &p);
    assert_eq!(state.pos.x, band.min_x);
    assert_eq!(state.vel.x, 1.0);

    for _ in 0..3_000 {
        advance(&mut state, &p);
        assert!(state.pos.x >= band.min_x && state.pos.x <= band.max_x);
        assert!(state.pos.y >= band.min_y && state.pos.y <= band.max_y);
    }
}

#[test]
fn orbit_returns_to_start_after_one_loop_corrected_cycle() {
    let p = MotionParams {
        mode: MotionMode::Orbit,
        width: 800.0,
        height: 600.0,
        sprite_width: 0.0,
        sprite_height: 0.0,
        amp_x: 1.0,
        amp_y: 1.0,
        speed: 1.0,
        mode_speed: 1.0,
        mode_duration: 8.0,
        loop_mode: true,
    };
    let band = p.band();
    let radius = 800.0 * 0.35;

    let start = at(&p, 0);
    assert_close(start, Point::new(band.cx + radius, band.cy), 1e-9);

    // Half a cycle sits on the opposite side of the ellipse.
    assert_close(at(&p, 240), Point::new(band.cx - radius, band.cy), 1e-6);
    assert_close(at(&p, 480), start, 1e-6);
}

#[test]
fn cyclic_modes_close_on_loop_boundary() {
    let cases = [(8.0, 1.0, 2.0), (2.5, 1.3, 1.0), (7.3, 0.7, 3.2), (12.0, 4.0, 0.1)];
    for mode in MotionMode::ALL.into_iter().filter(|m| m.is_cyclic()) {
        for (duration, speed, mode_speed) in cases {
            let mut p = params(mode);
            p.loop_mode = true;
            p.mode_duration = duration;
            p.speed = speed;
            p.mode_speed = mode_speed;

            let loop_frames = NOMINAL_FPS.secs_to_frames_round(duration);
            let t0 = p.phase(0);
            let t1 = p.phase(loop_frames);
            let cycles = (t1 - t0) / TAU;
            assert!((cycles - cycles.round()).abs() < 1e-9, "{mode} {duration}");

            assert_close(at(&p, 0), at(&p, loop_frames), 1e-6);
        }
    }
}

#[test]
fn free_running_cyclic_modes_do_not_snap() {
    let mut p = params(MotionMode::Orbit);
    p.mode_speed = 1.5;
    let cycles = p.phase(480) / TAU;
    assert!((cycles - 1.5).abs() < 1e-9);
}

#[test]
fn zigzag_is_a_confined_triangle_wave() {
    let mut p = params(MotionMode::Zigzag);
    p.loop_mode = true;
    p.mode_speed = 1.0;
    let band = p.band();

    assert_eq!(at(&p, 0).x, band.min_x);
    assert!((at(&p, 240).x - band.max_x).abs() < 1e-9);
    assert!((at(&p, 480).x - band.min_x).abs() < 1e-6);

    let mut prev = at(&p, 0).x;
    for time in 1..960 {
        let x = at(&p, time).x;
        assert!(x >= band.min_x && x <= band.max_x);
        let step = (band.max_x - band.min_x) * 2.0 / 480.0;
        assert!((x - prev).abs() <= step + 1e-9, "discontinuity at {time}");
        prev = x;
    }
}

#[test]
fn triangle_wave_shape() {
    assert_eq!(triangle(0.0), 0.0);
    assert_eq!(triangle(std::f64::consts::PI), 1.0);
    assert!((triangle(std::f64::consts::FRAC_PI_2) - 0.5).abs() < 1e-12);
    assert!((triangle(-std::f64::consts::FRAC_PI_2) - 0.5).abs() < 1e-12);
}

#[test]
fn figure8_doubles_vertical_frequency() {
    let mut p = params(MotionMode::Figure8);
    p.loop_mode = true;
    p.mode_speed = 1.0;
    let band = p.band();
    // Quarter cycle: sin(t) = 1, sin(2t) = 0.
    let q = at(&p, 120);
    assert!((q.x - (band.cx + band.max_rx * 0.9)).abs() < 1e-9);
    assert!((q.y - band.cy).abs() < 1e-9);
}

#[test]
fn lissajous_and_spiral_start_positions() {
    let p = params(MotionMode::Lissajous);
    let band = p.band();
    assert_close(
        at(&p, 0),
        Point::new(band.cx + band.max_rx * 0.95, band.cy),
        1e-9,
    );

    // Spiral at phase 0 uses the mid radius blend 0.15 + 0.85 * 0.5.
    let p = params(MotionMode::Spiral);
    let blend = 0.15 + 0.85 * 0.5;
    assert_close(
        at(&p, 0),
        Point::new(band.cx + band.max_rx * blend, band.cy),
        1e-9,
    );
}

#[test]
fn degenerate_geometry_collapses_to_a_point() {
    for mode in MotionMode::ALL {
        let mut p = params(mode);
        p.sprite_width = 800.0;
        p.sprite_height = 600.0;
        let mut state = AnimationState {
            vel: Vec2::new(0.6, -0.8),
            ..AnimationState::default()
        };
        for _ in 0..50 {
            advance(&mut state, &p);
            assert!(state.pos.x.is_finite() && state.pos.y.is_finite());
            assert_eq!(state.pos, Point::ZERO, "{mode}");
            state.end_frame();
        }
    }
}
