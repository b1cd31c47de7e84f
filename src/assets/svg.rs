use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{TrailError, TrailResult};

/// Upper bound on either raster dimension.
pub const MAX_RASTER_DIM: u32 = 16_384;

/// Font database with system fonts plus any `.ttf`/`.otf`/`.ttc` files found in `extra_dirs`.
pub fn build_fontdb(extra_dirs: &[&Path]) -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    for dir in extra_dirs {
        load_fonts_from_dir(&mut db, dir);
    }
    tracing::debug!(faces = db.len(), "font database ready");
    Arc::new(db)
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        let _ = db.load_font_file(&path);
    }
}

pub fn parse_svg(bytes: &[u8], fontdb: Arc<usvg::fontdb::Database>) -> TrailResult<usvg::Tree> {
    let opts = usvg::Options {
        fontdb,
        font_resolver: make_font_resolver(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(tree)
}

/// Raster size for an SVG drawn `svg_width * multiplier` pixels wide, aspect kept.
pub fn svg_target_size(tree: &usvg::Tree, svg_width: u32, multiplier: u32) -> TrailResult<(u32, u32)> {
    let size = tree.size();
    let (sw, sh) = (f64::from(size.width()), f64::from(size.height()));
    if !sw.is_finite() || !sh.is_finite() || sw <= 0.0 || sh <= 0.0 {
        return Err(TrailError::asset("svg has invalid width/height"));
    }

    let target = f64::from(svg_width) * f64::from(multiplier.max(1));
    let (w, h) = if target > 0.0 {
        let scale = target / sw;
        (target.round().max(1.0), (sh * scale).round().max(1.0))
    } else {
        (sw.ceil().max(1.0), sh.ceil().max(1.0))
    };
    let (w, h) = (w as u32, h as u32);

    if w > MAX_RASTER_DIM || h > MAX_RASTER_DIM {
        return Err(TrailError::asset(format!(
            "svg raster size too large: {w}x{h} (max {MAX_RASTER_DIM}x{MAX_RASTER_DIM})"
        )));
    }
    Ok((w, h))
}

/// Render `tree` stretched to `width x height`; output is premultiplied RGBA8.
pub fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> TrailResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| TrailError::asset("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.take())
}

fn make_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;

    FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                });
            }

            // Any installed face beats rendering nothing.
            families.push(usvg::fontdb::Family::SansSerif);
            families.push(usvg::fontdb::Family::Serif);
            families.push(usvg::fontdb::Family::Monospace);

            let style = match font.style() {
                usvg::FontStyle::Normal => usvg::fontdb::Style::Normal,
                usvg::FontStyle::Italic => usvg::fontdb::Style::Italic,
                usvg::FontStyle::Oblique => usvg::fontdb::Style::Oblique,
            };

            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style,
            };

            if let Some(id) = fontdb.query(&query) {
                return Some(id);
            }
            fontdb.faces().next().map(|f| f.id)
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}
