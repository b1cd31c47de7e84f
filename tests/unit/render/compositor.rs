use super::*;
use crate::motion::mode::MotionMode;

const CANVAS: Canvas = Canvas {
    width: 40,
    height: 30,
};

fn static_motion() -> MotionParams {
    MotionParams {
        mode: MotionMode::Static,
        width: 40.0,
        height: 30.0,
        sprite_width: 10.0,
        sprite_height: 10.0,
        amp_x: 0.9,
        amp_y: 0.9,
        speed: 1.0,
        mode_speed: 2.0,
        mode_duration: 8.0,
        loop_mode: false,
    }
}

fn trail_params() -> CompositeParams {
    CompositeParams {
        alpha_decay: 0.5,
        offset: Vec2::new(2.0, 0.0),
        speed: 1.0,
        background: Background::Transparent,
        tint: None,
    }
}

fn compositor_with(color: Rgb8) -> TrailCompositor {
    let mut c = TrailCompositor::new(CANVAS).unwrap();
    c.set_sprite(&Sprite::solid(10, 10, color).unwrap()).unwrap();
    c
}

#[test]
fn rejects_unusable_canvas() {
    assert!(TrailCompositor::new(Canvas::new(0, 10)).is_err());
    assert!(TrailCompositor::new(Canvas::new(10, 70_000)).is_err());
}

#[test]
fn frame_closes_out_state() {
    let mut c = compositor_with(Rgb8::WHITE);
    let mut state = AnimationState::default();
    c.render_frame(&mut state, &static_motion(), &trail_params());
    assert_eq!(state.time, 1);
    assert_eq!(state.color_time, 1);
    assert!(state.ping_pong);
    assert_eq!(state.pos, Point::new(15.0, 10.0));

    c.render_frame(&mut state, &static_motion(), &trail_params());
    assert_eq!(state.time, 2);
    assert!(!state.ping_pong);
}

#[test]
fn sprite_lands_on_solid_background() {
    let mut c = compositor_with(Rgb8::new(255, 0, 0));
    let mut state = AnimationState::default();
    let params = CompositeParams {
        background: Background::Solid(Rgb8::new(10, 20, 30)),
        ..trail_params()
    };
    c.render_frame(&mut state, &static_motion(), &params);

    assert_eq!(c.visible().pixel(20, 15), Some([255, 0, 0, 255]));
    assert_eq!(c.visible().pixel(2, 2), Some([10, 20, 30, 255]));
}

#[test]
fn previous_frame_decays_behind_the_offset() {
    let mut c = compositor_with(Rgb8::WHITE);
    let mut state = AnimationState::default();
    for _ in 0..6 {
        c.render_frame(&mut state, &static_motion(), &trail_params());
    }

    let v = c.visible();
    assert_eq!(v.pixel(20, 15), Some([255, 255, 255, 255]));
    // One decay step at opacity 0.5 truncates 255 to 128, two steps to 64.
    assert_eq!(v.pixel(25, 15), Some([128, 128, 128, 128]));
    assert_eq!(v.pixel(26, 15), Some([128, 128, 128, 128]));
    assert_eq!(v.pixel(27, 15).map(|p| p[3]), Some(64));
    assert_eq!(v.pixel(29, 15).map(|p| p[3]), Some(32));
    // Nothing moves against the offset.
    assert_eq!(v.pixel(14, 15), Some([0, 0, 0, 0]));
    assert_eq!(v.pixel(20, 9), Some([0, 0, 0, 0]));
}

#[test]
fn tint_recolors_trail_but_not_background() {
    let mut c = compositor_with(Rgb8::WHITE);
    let mut state = AnimationState::default();
    let params = CompositeParams {
        tint: Some(TintParams {
            stops: vec![Rgb8::new(255, 0, 0)],
            color_speed: 0.3,
            intensity: 1.0,
            duration_secs: 0.0,
        }),
        ..trail_params()
    };
    c.render_frame(&mut state, &static_motion(), &params);
    c.render_frame(&mut state, &static_motion(), &params);

    let v = c.visible();
    assert_eq!(v.pixel(25, 15), Some([128, 0, 0, 128]));
    assert_eq!(v.pixel(20, 15), Some([255, 255, 255, 255]));
    assert_eq!(v.pixel(2, 2), Some([0, 0, 0, 0]));
}

#[test]
fn tint_window_expires() {
    let tint = TintParams {
        stops: vec![Rgb8::new(255, 0, 0), Rgb8::new(0, 255, 0)],
        color_speed: 0.3,
        intensity: 0.6,
        duration_secs: 1.0,
    };
    assert_eq!(tint.color_at(0), Some(Rgb8::new(255, 0, 0)));
    assert!(tint.color_at(60).is_some());
    assert_eq!(tint.color_at(61), None);

    let unlimited = TintParams {
        duration_secs: 0.0,
        ..tint.clone()
    };
    assert!(unlimited.color_at(1_000_000).is_some());

    let empty = TintParams {
        stops: Vec::new(),
        ..tint
    };
    assert_eq!(empty.color_at(0), None);
}

#[test]
fn trail_residue_eventually_clears() {
    let mut c = compositor_with(Rgb8::WHITE);
    let mut state = AnimationState::default();
    let mut motion = static_motion();
    for _ in 0..4 {
        c.render_frame(&mut state, &motion, &trail_params());
    }

    // Push the sprite off-canvas so only decaying trail remains.
    motion.mode = MotionMode::Drift;
    motion.sprite_width = 0.0;
    motion.sprite_height = 0.0;
    state.vel = Vec2::ZERO;
    state.pos = Point::new(-100.0, -100.0);
    for _ in 0..40 {
        c.render_frame(&mut state, &motion, &trail_params());
    }
    assert!(c.visible().is_blank());
    assert!(c.trail(&state).is_blank());
}

#[test]
fn reset_clears_all_buffers() {
    let mut c = compositor_with(Rgb8::WHITE);
    let mut state = AnimationState::default();
    for _ in 0..3 {
        c.render_frame(&mut state, &static_motion(), &trail_params());
    }
    assert!(!c.visible().is_blank());
    c.reset();
    assert!(c.visible().is_blank());
    assert!(c.trail(&state).is_blank());
    assert!(c.has_sprite());
}

#[test]
fn no_sprite_shows_only_background() {
    let mut c = TrailCompositor::new(CANVAS).unwrap();
    let mut state = AnimationState::default();
    let params = CompositeParams {
        background: Background::Solid(Rgb8::BLACK),
        ..trail_params()
    };
    c.render_frame(&mut state, &static_motion(), &params);
    assert!(
        c.visible()
            .data()
            .chunks_exact(4)
            .all(|p| p == [0, 0, 0, 255])
    );
}

#[test]
fn static_preview_has_no_trail() {
    let mut c = compositor_with(Rgb8::WHITE);
    let mut state = AnimationState::default();
    for _ in 0..3 {
        c.render_frame(&mut state, &static_motion(), &trail_params());
    }
    c.render_static(
        Point::new(0.0, 0.0),
        (10.0, 10.0),
        Background::Solid(Rgb8::BLACK),
    );
    let v = c.visible();
    assert_eq!(v.pixel(5, 5), Some([255, 255, 255, 255]));
    assert_eq!(v.pixel(25, 15), Some([0, 0, 0, 255]));
}
