use std::fmt::Write as _;
use std::sync::Arc;

use crate::assets::bounds::{TransparencyMode, find_content_bounds};
use crate::assets::svg::{MAX_RASTER_DIM, parse_svg, rasterize_svg_to_premul_rgba8};
use crate::foundation::error::{TrailError, TrailResult};
use crate::palette::color::Rgb8;

/// A text sprite request.
#[derive(Clone, Debug, PartialEq)]
pub struct TextSpec {
    pub content: String,
    pub font_size: u32,
    pub font_family: String,
    pub color: Rgb8,
}

impl TextSpec {
    /// Transparent margin kept around the glyphs.
    pub fn padding(&self) -> u32 {
        (f64::from(self.font_size) * 0.1).ceil() as u32
    }
}

/// Rendered text, premultiplied RGBA8, trimmed to the glyphs plus [`TextSpec::padding`].
#[derive(Clone, Debug)]
pub struct TextRaster {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Vec<u8>,
}

#[tracing::instrument(level = "debug", skip(fontdb), fields(chars = spec.content.chars().count()))]
pub fn render_text(
    spec: &TextSpec,
    fontdb: Arc<usvg::fontdb::Database>,
) -> TrailResult<TextRaster> {
    let content = spec.content.trim();
    if content.is_empty() {
        return Err(TrailError::validation("text content is empty"));
    }
    if spec.font_size == 0 {
        return Err(TrailError::validation("font size must be > 0"));
    }

    // Generous layout box; the result is trimmed afterwards.
    let pad = spec.padding();
    let size = u64::from(spec.font_size);
    let chars = content.chars().count() as u64;
    let width = chars * size + 2 * u64::from(pad) + size;
    let height = size * 3 / 2 + 2 * u64::from(pad);
    if width > u64::from(MAX_RASTER_DIM) || height > u64::from(MAX_RASTER_DIM) {
        return Err(TrailError::validation(format!(
            "text raster too large: {width}x{height}"
        )));
    }
    let (width, height) = (width as u32, height as u32);

    let doc = text_svg_document(spec, content, width, height);
    let tree = parse_svg(doc.as_bytes(), fontdb)?;
    let rgba = rasterize_svg_to_premul_rgba8(&tree, width, height)?;

    let bounds = find_content_bounds(&rgba, width, height, TransparencyMode::None)
        .ok_or_else(|| TrailError::asset("text rendered no visible pixels (no usable font?)"))?
        .expand(pad, width, height);

    let mut out = Vec::with_capacity((bounds.w as usize) * (bounds.h as usize) * 4);
    for y in bounds.y..bounds.y + bounds.h {
        let start = ((y as usize) * (width as usize) + bounds.x as usize) * 4;
        out.extend_from_slice(&rgba[start..start + (bounds.w as usize) * 4]);
    }

    Ok(TextRaster {
        width: bounds.w,
        height: bounds.h,
        rgba8_premul: out,
    })
}

fn text_svg_document(spec: &TextSpec, content: &str, width: u32, height: u32) -> String {
    let pad = spec.padding();
    let baseline = pad + spec.font_size;
    let mut doc = String::new();
    let _ = write!(
        doc,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}">"#
    );
    let _ = write!(
        doc,
        r#"<text x="{pad}" y="{baseline}" font-size="{}" font-family="{}" fill="{}" xml:space="preserve">{}</text></svg>"#,
        spec.font_size,
        xml_escape(&spec.font_family),
        spec.color,
        xml_escape(content),
    );
    doc
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(content: &str) -> TextSpec {
        TextSpec {
            content: content.to_string(),
            font_size: 40,
            font_family: "sans-serif".to_string(),
            color: Rgb8::WHITE,
        }
    }

    #[test]
    fn padding_is_ten_percent_rounded_up() {
        assert_eq!(spec("a").padding(), 4);
        let mut s = spec("a");
        s.font_size = 128;
        assert_eq!(s.padding(), 13);
    }

    #[test]
    fn empty_text_is_rejected() {
        let db = Arc::new(usvg::fontdb::Database::new());
        assert!(matches!(
            render_text(&spec("   "), db),
            Err(TrailError::Validation(_))
        ));
    }

    #[test]
    fn document_escapes_markup() {
        let mut s = spec("a<b & \"c\"");
        s.font_family = "Fira's".to_string();
        let doc = text_svg_document(&s, &s.content, 100, 60);
        assert!(doc.contains("a&lt;b &amp; &quot;c&quot;"));
        assert!(doc.contains("font-family=\"Fira&apos;s\""));
        assert!(doc.contains("fill=\"#ffffff\""));
        let db = Arc::new(usvg::fontdb::Database::new());
        parse_svg(doc.as_bytes(), db).unwrap();
    }

    #[test]
    fn renders_with_system_fonts_when_available() {
        let db = crate::assets::svg::build_fontdb(&[]);
        if db.len() == 0 {
            return;
        }
        let raster = render_text(&spec("Hi"), db).unwrap();
        assert!(raster.width > 8 && raster.height > 8);
        assert_eq!(
            raster.rgba8_premul.len(),
            (raster.width * raster.height * 4) as usize
        );
    }
}
