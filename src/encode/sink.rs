use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{TrailError, TrailResult};
use crate::foundation::math::mul_div255_u16;
use crate::palette::color::Rgb8;
use crate::render::surface::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before the first captured frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Color to flatten alpha over for sinks without an alpha channel.
    pub background: Rgb8,
}

/// Sink contract for consuming captured frames.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order, starting
/// at 0 for the first captured frame.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> TrailResult<()>;
    /// Push one frame in strictly increasing order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> TrailResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> TrailResult<()>;
}

/// Shared ordering/size checks for sink implementations.
#[derive(Debug, Default, Clone)]
pub(crate) struct FrameOrder {
    last_idx: Option<FrameIndex>,
}

impl FrameOrder {
    pub(crate) fn reset(&mut self) {
        self.last_idx = None;
    }

    pub(crate) fn check(
        &mut self,
        cfg: &SinkConfig,
        idx: FrameIndex,
        frame: &FrameRGBA,
    ) -> TrailResult<()> {
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(TrailError::encode("sink received out-of-order frame index"));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(TrailError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != (cfg.width as usize) * (cfg.height as usize) * 4 {
            return Err(TrailError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }
        self.last_idx = Some(idx);
        Ok(())
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    order: FrameOrder,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Whether `end` has been called since the last `begin`.
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> TrailResult<()> {
        self.cfg = Some(cfg);
        self.order.reset();
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> TrailResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| TrailError::encode("in-memory sink not started"))?;
        self.order.check(cfg, idx, frame)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> TrailResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Flatten premultiplied RGBA8 over an opaque background, in place.
pub fn flatten_premul_over_bg(premul: &mut [u8], bg: Rgb8) {
    let bg_rgb = [u16::from(bg.r), u16::from(bg.g), u16::from(bg.b)];
    for px in premul.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        let inv = 255u16 - a;
        for c in 0..3 {
            let v = u16::from(px[c]) + mul_div255_u16(bg_rgb[c], inv);
            px[c] = v.min(255) as u8;
        }
        px[3] = 255;
    }
}
