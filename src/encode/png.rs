use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::assets::decode::unpremultiply_rgba8_in_place;
use crate::encode::sink::{FrameOrder, FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{TrailError, TrailResult};
use crate::render::surface::FrameRGBA;

/// Writes each frame as `frame_00000.png`, `frame_00001.png`, ... with straight alpha.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    order: FrameOrder,
    written: u64,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            order: FrameOrder::default(),
            written: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn frames_written(&self) -> u64 {
        self.written
    }

    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("frame_{:05}.png", idx.0))
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> TrailResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(TrailError::validation(
                "png sink width/height must be non-zero",
            ));
        }
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create output directory '{}'", self.dir.display()))?;
        tracing::debug!(dir = %self.dir.display(), "png sequence sink started");
        self.cfg = Some(cfg);
        self.order.reset();
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> TrailResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| TrailError::encode("png sink not started"))?;
        self.order.check(cfg, idx, frame)?;

        let mut rgba = frame.data.clone();
        if frame.premultiplied {
            unpremultiply_rgba8_in_place(&mut rgba);
        }
        let img = image::RgbaImage::from_raw(frame.width, frame.height, rgba)
            .ok_or_else(|| TrailError::encode("frame buffer does not match its dimensions"))?;
        let path = self.frame_path(idx);
        img.save(&path)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> TrailResult<()> {
        tracing::debug!(frames = self.written, "png sequence sink finished");
        self.cfg = None;
        Ok(())
    }
}
