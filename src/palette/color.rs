use serde::{Deserialize, Serialize};
use std::fmt;

/// Straight 8-bit RGB color, the unit of palette stops and solid backgrounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Construct from channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Parse any hex form accepted by [`normalize_hex`].
    pub fn from_hex(s: &str) -> Option<Self> {
        let norm = normalize_hex(s)?;
        let byte = |i: usize| u8::from_str_radix(&norm[i..i + 2], 16).ok();
        Some(Self::new(byte(1)?, byte(3)?, byte(5)?))
    }

    /// Premultiplied RGBA8 for this color at `alpha`.
    pub fn to_premul_rgba8(self, alpha: u8) -> [u8; 4] {
        let a = u16::from(alpha);
        let premul = |c: u8| (((u16::from(c) * a) + 127) / 255) as u8;
        [premul(self.r), premul(self.g), premul(self.b), alpha]
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb8 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Rgb8::from_hex(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid hex color \"{s}\" (expected #rgb or #rrggbb)"
            ))
        })
    }
}

/// Normalize a hex color to lowercase `#rrggbb`.
///
/// Accepts 3 or 6 hex digits, with or without a leading `#`, any case. Three-digit shorthand
/// doubles each nibble. Returns `None` for anything else.
pub fn normalize_hex(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_owned(),
        _ => return None,
    };
    Some(format!("#{}", expanded.to_ascii_lowercase()))
}

/// Parse a comma-separated list of hex colors, silently dropping invalid entries.
pub fn parse_palette_input(value: &str) -> Vec<Rgb8> {
    value.split(',').filter_map(Rgb8::from_hex).collect()
}
