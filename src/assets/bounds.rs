use crate::foundation::error::{TrailError, TrailResult};

/// Pixels with alpha below this are always background.
pub const ALPHA_BACKGROUND_BELOW: u8 = 10;
/// `black` key: every RGB channel below this is background.
pub const BLACK_KEY_BELOW: u8 = 20;
/// `white` key: every RGB channel above this is background.
pub const WHITE_KEY_ABOVE: u8 = 235;

/// Color keying applied to opaque JPEG sources.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransparencyMode {
    #[default]
    None,
    Black,
    White,
}

impl TransparencyMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" => Some(Self::None),
            "black" => Some(Self::Black),
            "white" => Some(Self::White),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Black => "black",
            Self::White => "white",
        }
    }

    /// Whether an RGB triple is keyed out under this mode.
    pub fn keys_out(self, r: u8, g: u8, b: u8) -> bool {
        match self {
            Self::None => false,
            Self::Black => r < BLACK_KEY_BELOW && g < BLACK_KEY_BELOW && b < BLACK_KEY_BELOW,
            Self::White => r > WHITE_KEY_ABOVE && g > WHITE_KEY_ABOVE && b > WHITE_KEY_ABOVE,
        }
    }
}

/// Axis-aligned pixel rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelBounds {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl PixelBounds {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            w: width,
            h: height,
        }
    }

    /// Grow by `pad` on every side, clipped to `width x height`.
    pub fn expand(self, pad: u32, width: u32, height: u32) -> Self {
        let x0 = self.x.saturating_sub(pad);
        let y0 = self.y.saturating_sub(pad);
        let x1 = (self.x + self.w).saturating_add(pad).min(width);
        let y1 = (self.y + self.h).saturating_add(pad).min(height);
        Self {
            x: x0,
            y: y0,
            w: x1 - x0,
            h: y1 - y0,
        }
    }
}

/// Tight bounding box of non-background pixels in straight RGBA8, or `None` if there are none.
pub fn find_content_bounds(
    rgba: &[u8],
    width: u32,
    height: u32,
    mode: TransparencyMode,
) -> Option<PixelBounds> {
    let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
    let (mut max_x, mut max_y) = (0u32, 0u32);
    let mut found = false;

    for y in 0..height {
        let row = (y as usize) * (width as usize) * 4;
        for x in 0..width {
            let i = row + (x as usize) * 4;
            let Some(px) = rgba.get(i..i + 4) else {
                return None;
            };
            if px[3] < ALPHA_BACKGROUND_BELOW || mode.keys_out(px[0], px[1], px[2]) {
                continue;
            }
            found = true;
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    found.then(|| PixelBounds {
        x: min_x,
        y: min_y,
        w: max_x - min_x + 1,
        h: max_y - min_y + 1,
    })
}

/// Bounds with fallbacks: keyed, then unkeyed, then the full image.
///
/// Returns the bounds and the mode that actually produced them.
pub fn resolve_content_bounds(
    rgba: &[u8],
    width: u32,
    height: u32,
    mode: TransparencyMode,
) -> (PixelBounds, TransparencyMode) {
    if let Some(b) = find_content_bounds(rgba, width, height, mode) {
        return (b, mode);
    }
    if mode != TransparencyMode::None
        && let Some(b) = find_content_bounds(rgba, width, height, TransparencyMode::None)
    {
        tracing::debug!(mode = mode.as_str(), "color key removed everything; trimming unkeyed");
        return (b, TransparencyMode::None);
    }
    tracing::warn!(width, height, "content bounds empty; using full image");
    (PixelBounds::full(width, height), TransparencyMode::None)
}

/// Crop straight RGBA8 to `bounds`, zeroing alpha on keyed pixels.
pub fn trim(
    rgba: &[u8],
    width: u32,
    height: u32,
    bounds: PixelBounds,
    mode: TransparencyMode,
) -> TrailResult<Vec<u8>> {
    if bounds.w == 0
        || bounds.h == 0
        || bounds.x + bounds.w > width
        || bounds.y + bounds.h > height
        || rgba.len() != (width as usize) * (height as usize) * 4
    {
        return Err(TrailError::asset("trim bounds outside image"));
    }

    let mut out = Vec::with_capacity((bounds.w as usize) * (bounds.h as usize) * 4);
    for y in bounds.y..bounds.y + bounds.h {
        let start = ((y as usize) * (width as usize) + bounds.x as usize) * 4;
        out.extend_from_slice(&rgba[start..start + (bounds.w as usize) * 4]);
    }

    if mode != TransparencyMode::None {
        for px in out.chunks_exact_mut(4) {
            if mode.keys_out(px[0], px[1], px[2]) {
                px[3] = 0;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(width: u32, height: u32, bg: [u8; 4], dots: &[(u32, u32, [u8; 4])]) -> Vec<u8> {
        let mut buf = bg.repeat((width * height) as usize);
        for &(x, y, px) in dots {
            let i = ((y * width + x) * 4) as usize;
            buf[i..i + 4].copy_from_slice(&px);
        }
        buf
    }

    #[test]
    fn bounds_ignore_nearly_transparent_pixels() {
        let buf = image(
            5,
            4,
            [0, 0, 0, 0],
            &[(1, 1, [255, 0, 0, 255]), (3, 2, [0, 255, 0, 10]), (4, 3, [9, 9, 9, 9])],
        );
        let b = find_content_bounds(&buf, 5, 4, TransparencyMode::None).unwrap();
        assert_eq!(b, PixelBounds { x: 1, y: 1, w: 3, h: 2 });
    }

    #[test]
    fn black_and_white_keys() {
        let black = image(4, 4, [10, 10, 10, 255], &[(2, 1, [200, 50, 50, 255])]);
        let b = find_content_bounds(&black, 4, 4, TransparencyMode::Black).unwrap();
        assert_eq!(b, PixelBounds { x: 2, y: 1, w: 1, h: 1 });

        let white = image(4, 4, [240, 250, 255, 255], &[(0, 3, [10, 10, 10, 255])]);
        let b = find_content_bounds(&white, 4, 4, TransparencyMode::White).unwrap();
        assert_eq!(b, PixelBounds { x: 0, y: 3, w: 1, h: 1 });
    }

    #[test]
    fn resolve_falls_back_to_unkeyed_then_full() {
        let all_black = image(3, 2, [0, 0, 0, 255], &[]);
        let (b, mode) = resolve_content_bounds(&all_black, 3, 2, TransparencyMode::Black);
        assert_eq!(b, PixelBounds::full(3, 2));
        assert_eq!(mode, TransparencyMode::None);

        let empty = image(3, 2, [0, 0, 0, 0], &[]);
        let (b, mode) = resolve_content_bounds(&empty, 3, 2, TransparencyMode::None);
        assert_eq!(b, PixelBounds::full(3, 2));
        assert_eq!(mode, TransparencyMode::None);
    }

    #[test]
    fn trim_crops_and_applies_key() {
        let buf = image(
            3,
            3,
            [0, 0, 0, 0],
            &[(1, 1, [255, 255, 255, 255]), (2, 1, [5, 5, 5, 255]), (2, 2, [80, 0, 0, 255])],
        );
        let b = PixelBounds { x: 1, y: 1, w: 2, h: 2 };
        let out = trim(&buf, 3, 3, b, TransparencyMode::Black).unwrap();
        assert_eq!(out.len(), 16);
        assert_eq!(&out[0..4], &[255, 255, 255, 255]);
        assert_eq!(out[7], 0);
        assert_eq!(&out[12..16], &[80, 0, 0, 255]);

        let oob = PixelBounds { x: 2, y: 2, w: 2, h: 1 };
        assert!(trim(&buf, 3, 3, oob, TransparencyMode::None).is_err());
    }

    #[test]
    fn expand_clips_to_image() {
        let b = PixelBounds { x: 1, y: 2, w: 3, h: 1 }.expand(2, 5, 4);
        assert_eq!(b, PixelBounds { x: 0, y: 0, w: 5, h: 4 });
    }

    #[test]
    fn transparency_mode_names_roundtrip() {
        for m in [TransparencyMode::None, TransparencyMode::Black, TransparencyMode::White] {
            assert_eq!(TransparencyMode::from_name(m.as_str()), Some(m));
        }
        assert_eq!(TransparencyMode::from_name("grey"), None);
    }
}
