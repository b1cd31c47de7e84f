use crate::assets::sprite::Sprite;
use crate::foundation::core::{Canvas, NOMINAL_FPS, Point, Vec2};
use crate::foundation::error::{TrailError, TrailResult};
use crate::motion::advance::advance;
use crate::motion::params::MotionParams;
use crate::motion::state::AnimationState;
use crate::palette::color::Rgb8;
use crate::palette::sampler;
use crate::render::cleanup::TrailCleanup;
use crate::render::composite::{decay_shift_into, over_in_place, tint_atop_in_place};
use crate::render::draw::SpritePainter;
use crate::render::surface::Surface;

/// What sits underneath the trail on the visible surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Background {
    #[default]
    Transparent,
    Solid(Rgb8),
}

impl Background {
    fn premul(self) -> [u8; 4] {
        match self {
            Self::Transparent => [0, 0, 0, 0],
            Self::Solid(c) => c.to_premul_rgba8(255),
        }
    }
}

/// Palette tint applied over the whole trail each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct TintParams {
    /// At least one stop; an empty list disables tinting.
    pub stops: Vec<Rgb8>,
    pub color_speed: f64,
    /// Opacity of the tint fill, `[0, 1]`.
    pub intensity: f64,
    /// Seconds of tinting after start; `0` means unlimited.
    pub duration_secs: f64,
}

impl TintParams {
    /// Tint color for `color_time`, or `None` once the tint window has elapsed.
    pub fn color_at(&self, color_time: u64) -> Option<Rgb8> {
        if self.duration_secs > 0.0 && NOMINAL_FPS.frames_to_secs(color_time) > self.duration_secs {
            return None;
        }
        sampler::sample(&self.stops, color_time as f64 * self.color_speed * 0.01)
    }
}

/// Per-frame compositing knobs.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeParams {
    /// Opacity the previous frame is redrawn at, `(0, 1)`.
    pub alpha_decay: f64,
    /// Base trail offset in pixels per frame; scaled by `speed`.
    pub offset: Vec2,
    pub speed: f64,
    pub background: Background,
    pub tint: Option<TintParams>,
}

impl Default for CompositeParams {
    fn default() -> Self {
        Self {
            alpha_decay: 0.92,
            offset: Vec2::new(1.5, 0.5),
            speed: 1.0,
            background: Background::Solid(Rgb8::BLACK),
            tint: None,
        }
    }
}

/// Ping-pong trail buffers plus the visible surface.
#[derive(Debug)]
pub struct TrailCompositor {
    canvas: Canvas,
    buffer_a: Surface,
    buffer_b: Surface,
    visible: Surface,
    cleanup: TrailCleanup,
    painter: Option<SpritePainter>,
}

impl TrailCompositor {
    /// Buffers for `canvas`; both dimensions must be in `1..=65535`.
    pub fn new(canvas: Canvas) -> TrailResult<Self> {
        if canvas.width == 0
            || canvas.height == 0
            || u16::try_from(canvas.width).is_err()
            || u16::try_from(canvas.height).is_err()
        {
            return Err(TrailError::validation(format!(
                "canvas {}x{} out of range",
                canvas.width, canvas.height
            )));
        }
        Ok(Self {
            canvas,
            buffer_a: Surface::new(canvas),
            buffer_b: Surface::new(canvas),
            visible: Surface::new(canvas),
            cleanup: TrailCleanup::default(),
            painter: None,
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Clear every buffer. The sprite is kept.
    pub fn reset(&mut self) {
        self.buffer_a.clear();
        self.buffer_b.clear();
        self.visible.clear();
    }

    pub fn set_sprite(&mut self, sprite: &Sprite) -> TrailResult<()> {
        self.painter = Some(SpritePainter::new(sprite, self.canvas)?);
        self.reset();
        Ok(())
    }

    pub fn has_sprite(&self) -> bool {
        self.painter.is_some()
    }

    pub fn visible(&self) -> &Surface {
        &self.visible
    }

    /// The trail buffer that the next frame will read.
    pub fn trail(&self, state: &AnimationState) -> &Surface {
        if state.ping_pong {
            &self.buffer_b
        } else {
            &self.buffer_a
        }
    }

    /// Composite one animation frame and close it out on `state`.
    ///
    /// Order: decay-shift the previous trail into the write buffer, tint, clean up residue,
    /// advance motion, draw the sprite, then present over the background.
    pub fn render_frame(
        &mut self,
        state: &mut AnimationState,
        motion: &MotionParams,
        params: &CompositeParams,
    ) {
        let (read, write) = if state.ping_pong {
            (&self.buffer_b, &mut self.buffer_a)
        } else {
            (&self.buffer_a, &mut self.buffer_b)
        };
        let (w, h) = (self.canvas.width, self.canvas.height);

        write.clear();
        decay_shift_into(
            write.data_mut(),
            read.data(),
            w,
            h,
            params.offset * params.speed,
            params.alpha_decay,
        );

        if let Some(tint) = &params.tint
            && let Some(color) = tint.color_at(state.color_time)
        {
            tint_atop_in_place(write.data_mut(), color, tint.intensity);
        }

        self.cleanup.apply(write.data_mut(), w, h, state.time);

        advance(state, motion);

        if let Some(painter) = &mut self.painter {
            painter.draw(write, state.pos, (motion.sprite_width, motion.sprite_height));
        }

        self.visible.fill(params.background.premul());
        over_in_place(self.visible.data_mut(), write.data(), 1.0);

        state.end_frame();
    }

    /// Present the sprite at `pos` on the background with no trail.
    pub fn render_static(&mut self, pos: Point, size: (f64, f64), background: Background) {
        self.visible.fill(background.premul());
        if let Some(painter) = &mut self.painter {
            painter.draw(&mut self.visible, pos, size);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
