use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::Context;

use crate::assets::bounds::{PixelBounds, TransparencyMode, resolve_content_bounds, trim};
use crate::assets::decode::{
    RgbaImage, SourceKind, decode_raster, premultiply_rgba8_in_place, resize_lanczos,
    scaled_dimensions, unpremultiply_rgba8_in_place,
};
use crate::assets::svg::{build_fontdb, parse_svg, rasterize_svg_to_premul_rgba8, svg_target_size};
use crate::assets::text::{TextSpec, render_text};
use crate::foundation::error::{TrailError, TrailResult};
use crate::palette::color::Rgb8;

/// The trimmed content raster drawn each frame, premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sprite {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl Sprite {
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> TrailResult<Self> {
        if width == 0 || height == 0 {
            return Err(TrailError::asset("sprite has zero size"));
        }
        if u16::try_from(width).is_err() || u16::try_from(height).is_err() {
            return Err(TrailError::asset(format!(
                "sprite {width}x{height} exceeds the drawable size limit"
            )));
        }
        if rgba8_premul.len() != (width as usize) * (height as usize) * 4 {
            return Err(TrailError::asset("sprite byte length mismatch"));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    pub fn from_straight_rgba(width: u32, height: u32, mut rgba8: Vec<u8>) -> TrailResult<Self> {
        premultiply_rgba8_in_place(&mut rgba8);
        Self::from_premul(width, height, rgba8)
    }

    /// Opaque single-color block.
    pub fn solid(width: u32, height: u32, color: Rgb8) -> TrailResult<Self> {
        let px = color.to_premul_rgba8(255);
        Self::from_premul(width, height, px.repeat((width as usize) * (height as usize)))
    }

    /// On-canvas size at `content_scale`.
    pub fn draw_size(&self, content_scale: f64) -> (f64, f64) {
        (
            f64::from(self.width) * content_scale,
            f64::from(self.height) * content_scale,
        )
    }
}

/// Source preparation knobs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpriteOptions {
    /// Color key, honored for JPEG sources only.
    pub transparency: TransparencyMode,
    pub raster_resize: bool,
    pub raster_width: u32,
    pub svg_width: u32,
    pub svg_scale_multiplier: u32,
}

impl Default for SpriteOptions {
    fn default() -> Self {
        Self {
            transparency: TransparencyMode::None,
            raster_resize: false,
            raster_width: 1600,
            svg_width: 1200,
            svg_scale_multiplier: 1,
        }
    }
}

/// A prepared sprite plus how it was derived.
#[derive(Clone, Debug)]
pub struct LoadedSprite {
    pub sprite: Sprite,
    pub source_size: (u32, u32),
    /// Size after rasterization or resize, before trimming.
    pub raster_size: (u32, u32),
    pub bounds: PixelBounds,
    /// Keying actually applied; may fall back to `None`.
    pub transparency: TransparencyMode,
}

/// Turns files, bytes, or text into sprites. Fonts are loaded on first SVG or text use.
#[derive(Debug, Default)]
pub struct SpriteLoader {
    font_dirs: Vec<PathBuf>,
    fontdb: OnceLock<Arc<usvg::fontdb::Database>>,
}

impl SpriteLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also load fonts from `dir` (searched non-recursively).
    pub fn with_font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.font_dirs.push(dir.into());
        self
    }

    fn fontdb(&self) -> Arc<usvg::fontdb::Database> {
        self.fontdb
            .get_or_init(|| {
                let dirs: Vec<&Path> = self.font_dirs.iter().map(PathBuf::as_path).collect();
                build_fontdb(&dirs)
            })
            .clone()
    }

    #[tracing::instrument(level = "debug", skip(self, opts))]
    pub fn load_path(&self, path: &Path, opts: &SpriteOptions) -> TrailResult<LoadedSprite> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read sprite source {}", path.display()))?;
        let loaded = self.load_bytes(&bytes, SourceKind::from_path(path), opts)?;
        tracing::info!(
            path = %path.display(),
            width = loaded.sprite.width,
            height = loaded.sprite.height,
            "sprite ready"
        );
        Ok(loaded)
    }

    pub fn load_bytes(
        &self,
        bytes: &[u8],
        kind: SourceKind,
        opts: &SpriteOptions,
    ) -> TrailResult<LoadedSprite> {
        let (source_size, img) = match kind {
            SourceKind::Svg => {
                let tree = parse_svg(bytes, self.fontdb())?;
                let size = tree.size();
                let source_size = (
                    size.width().ceil().max(1.0) as u32,
                    size.height().ceil().max(1.0) as u32,
                );
                let (w, h) = svg_target_size(&tree, opts.svg_width, opts.svg_scale_multiplier)?;
                let mut rgba8 = rasterize_svg_to_premul_rgba8(&tree, w, h)?;
                unpremultiply_rgba8_in_place(&mut rgba8);
                (
                    source_size,
                    RgbaImage {
                        width: w,
                        height: h,
                        rgba8,
                    },
                )
            }
            _ => {
                let img = decode_raster(bytes)?;
                let source_size = (img.width, img.height);
                let img = if kind.is_resizable_raster() && opts.raster_resize {
                    let (w, h) = scaled_dimensions(img.width, img.height, opts.raster_width);
                    resize_lanczos(img, w, h)?
                } else {
                    img
                };
                (source_size, img)
            }
        };

        let requested = if kind == SourceKind::Jpeg {
            opts.transparency
        } else {
            TransparencyMode::None
        };
        let (bounds, transparency) =
            resolve_content_bounds(&img.rgba8, img.width, img.height, requested);
        let trimmed = trim(&img.rgba8, img.width, img.height, bounds, transparency)?;
        let sprite = Sprite::from_straight_rgba(bounds.w, bounds.h, trimmed)?;

        tracing::debug!(
            ?source_size,
            raster = ?(img.width, img.height),
            ?bounds,
            mode = transparency.as_str(),
            "trimmed sprite source"
        );

        Ok(LoadedSprite {
            sprite,
            source_size,
            raster_size: (img.width, img.height),
            bounds,
            transparency,
        })
    }

    pub fn render_text(&self, spec: &TextSpec) -> TrailResult<Sprite> {
        let raster = render_text(spec, self.fontdb())?;
        Sprite::from_premul(raster.width, raster.height, raster.rgba8_premul)
    }
}
