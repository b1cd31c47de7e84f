use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{TrailError, TrailResult};

/// Source format, decided by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Png,
    Jpeg,
    Svg,
    /// Any other raster format `image` can decode; never resized or keyed.
    Other,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png") => Self::Png,
            Some("jpg" | "jpeg") => Self::Jpeg,
            Some("svg") => Self::Svg,
            _ => Self::Other,
        }
    }

    pub fn is_resizable_raster(self) -> bool {
        matches!(self, Self::Png | Self::Jpeg)
    }
}

/// Decoded raster in straight (non-premultiplied) RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub rgba8: Vec<u8>,
}

pub fn decode_raster(bytes: &[u8]) -> TrailResult<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(TrailError::asset("image has zero size"));
    }
    Ok(RgbaImage {
        width,
        height,
        rgba8: rgba.into_raw(),
    })
}

/// High-quality (Lanczos3) resize; returns the input unchanged when already at the target size.
pub fn resize_lanczos(img: RgbaImage, width: u32, height: u32) -> TrailResult<RgbaImage> {
    if img.width == width && img.height == height {
        return Ok(img);
    }
    let src = image::RgbaImage::from_raw(img.width, img.height, img.rgba8)
        .ok_or_else(|| TrailError::asset("raster byte length mismatch"))?;
    let out = image::imageops::resize(&src, width, height, image::imageops::FilterType::Lanczos3);
    Ok(RgbaImage {
        width,
        height,
        rgba8: out.into_raw(),
    })
}

/// `(width, height)` for a raster resized to `target_width`, keeping aspect.
pub fn scaled_dimensions(src_w: u32, src_h: u32, target_width: u32) -> (u32, u32) {
    if src_w == 0 || target_width == 0 {
        return (src_w, src_h);
    }
    let scale = f64::from(target_width) / f64::from(src_w);
    let h = (f64::from(src_h) * scale).round().max(1.0) as u32;
    (target_width.max(1), h)
}

pub fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[0..3] {
            *c = (((*c as u16) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}
