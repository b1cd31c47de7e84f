use std::sync::Arc;

use crate::assets::sprite::Sprite;
use crate::foundation::core::{Canvas, Point};
use crate::foundation::error::{TrailError, TrailResult};
use crate::render::composite::over_in_place;
use crate::render::surface::Surface;

/// Draws one sprite, scaled and positioned, onto premultiplied surfaces via `vello_cpu`.
pub struct SpritePainter {
    paint: vello_cpu::Image,
    src_w: f64,
    src_h: f64,
    scratch: vello_cpu::Pixmap,
    canvas: Canvas,
}

impl std::fmt::Debug for SpritePainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpritePainter")
            .field("src_w", &self.src_w)
            .field("src_h", &self.src_h)
            .field("canvas", &self.canvas)
            .finish_non_exhaustive()
    }
}

impl SpritePainter {
    pub fn new(sprite: &Sprite, canvas: Canvas) -> TrailResult<Self> {
        let pixmap = sprite_to_pixmap(sprite)?;
        let (cw, ch) = canvas_dims(canvas)?;
        Ok(Self {
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            src_w: f64::from(sprite.width),
            src_h: f64::from(sprite.height),
            scratch: vello_cpu::Pixmap::new(cw, ch),
            canvas,
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Source-over the sprite at `pos` with on-canvas size `size` (width, height).
    ///
    /// Non-finite or empty geometry draws nothing.
    pub fn draw(&mut self, target: &mut Surface, pos: Point, size: (f64, f64)) {
        let (w, h) = size;
        if !(pos.x.is_finite() && pos.y.is_finite() && w.is_finite() && h.is_finite())
            || w <= 0.0
            || h <= 0.0
            || target.canvas() != self.canvas
        {
            return;
        }

        self.scratch.data_as_u8_slice_mut().fill(0);

        let transform = vello_cpu::kurbo::Affine::translate((pos.x, pos.y))
            * vello_cpu::kurbo::Affine::scale_non_uniform(w / self.src_w, h / self.src_h);

        let mut ctx =
            vello_cpu::RenderContext::new(self.scratch.width(), self.scratch.height());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(transform);
        ctx.set_paint(self.paint.clone());
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, self.src_w, self.src_h));
        ctx.flush();
        ctx.render_to_pixmap(&mut self.scratch);

        over_in_place(target.data_mut(), self.scratch.data_as_u8_slice(), 1.0);
    }
}

fn canvas_dims(canvas: Canvas) -> TrailResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| TrailError::validation("canvas width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| TrailError::validation("canvas height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(TrailError::validation("canvas must be non-empty"));
    }
    Ok((w, h))
}

fn sprite_to_pixmap(sprite: &Sprite) -> TrailResult<vello_cpu::Pixmap> {
    let w: u16 = sprite
        .width
        .try_into()
        .map_err(|_| TrailError::asset("sprite width exceeds u16"))?;
    let h: u16 = sprite
        .height
        .try_into()
        .map_err(|_| TrailError::asset("sprite height exceeds u16"))?;
    if sprite.rgba8_premul.len() != sprite.width as usize * sprite.height as usize * 4 {
        return Err(TrailError::asset("sprite byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(sprite.width as usize * sprite.height as usize);
    for px in sprite.rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::color::Rgb8;

    #[test]
    fn draws_opaque_sprite_at_integer_position() {
        let canvas = Canvas::new(16, 16);
        let sprite = Sprite::solid(4, 4, Rgb8::new(255, 0, 0)).unwrap();
        let mut painter = SpritePainter::new(&sprite, canvas).unwrap();
        let mut surface = Surface::new(canvas);

        painter.draw(&mut surface, Point::new(4.0, 6.0), (4.0, 4.0));

        assert_eq!(surface.pixel(5, 7), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(12, 12), Some([0, 0, 0, 0]));
    }

    #[test]
    fn scaled_draw_covers_scaled_area() {
        let canvas = Canvas::new(32, 32);
        let sprite = Sprite::solid(4, 4, Rgb8::WHITE).unwrap();
        let mut painter = SpritePainter::new(&sprite, canvas).unwrap();
        let mut surface = Surface::new(canvas);

        painter.draw(&mut surface, Point::new(0.0, 0.0), (16.0, 8.0));

        assert_eq!(surface.pixel(14, 6).map(|p| p[3]), Some(255));
        assert_eq!(surface.pixel(20, 6).map(|p| p[3]), Some(0));
        assert_eq!(surface.pixel(14, 12).map(|p| p[3]), Some(0));
    }

    #[test]
    fn degenerate_geometry_draws_nothing() {
        let canvas = Canvas::new(8, 8);
        let sprite = Sprite::solid(2, 2, Rgb8::WHITE).unwrap();
        let mut painter = SpritePainter::new(&sprite, canvas).unwrap();
        let mut surface = Surface::new(canvas);

        painter.draw(&mut surface, Point::new(f64::NAN, 0.0), (2.0, 2.0));
        painter.draw(&mut surface, Point::new(0.0, 0.0), (0.0, 2.0));
        assert!(surface.is_blank());
    }

    #[test]
    fn oversized_canvas_is_rejected() {
        let sprite = Sprite::solid(1, 1, Rgb8::WHITE).unwrap();
        assert!(SpritePainter::new(&sprite, Canvas::new(70_000, 10)).is_err());
        assert!(SpritePainter::new(&sprite, Canvas::new(0, 10)).is_err());
    }
}
