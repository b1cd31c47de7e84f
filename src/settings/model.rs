use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assets::bounds::TransparencyMode;
use crate::assets::sprite::SpriteOptions;
use crate::assets::text::TextSpec;
use crate::foundation::core::{Canvas, Vec2};
use crate::motion::mode::MotionMode;
use crate::motion::params::MotionParams;
use crate::palette::color::Rgb8;
use crate::palette::presets::{self, MAX_PRESET_INDEX};
use crate::render::compositor::{Background, CompositeParams, TintParams};

/// Canvas presets offered besides `custom`.
pub const CANVAS_PRESETS: [(u32, u32); 5] = [
    (512, 512),
    (800, 600),
    (1024, 768),
    (1280, 720),
    (1920, 1080),
];

/// Canvas size selection, serialized as `"W,H"` or `"custom"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CanvasPreset {
    Fixed { width: u32, height: u32 },
    Custom,
}

impl CanvasPreset {
    /// Parse one of the allowed preset strings.
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "custom" {
            return Some(Self::Custom);
        }
        let (w, h) = name.split_once(',')?;
        let width = w.trim().parse().ok()?;
        let height = h.trim().parse().ok()?;
        CANVAS_PRESETS
            .contains(&(width, height))
            .then_some(Self::Fixed { width, height })
    }
}

impl Default for CanvasPreset {
    fn default() -> Self {
        Self::Fixed {
            width: 800,
            height: 600,
        }
    }
}

impl fmt::Display for CanvasPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed { width, height } => write!(f, "{width},{height}"),
            Self::Custom => f.write_str("custom"),
        }
    }
}

impl Serialize for CanvasPreset {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CanvasPreset {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_name(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown canvas preset \"{s}\"")))
    }
}

/// Palette selection, serialized as the preset index string or `"custom"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaletteSelect {
    /// Preset by index; `0` disables tinting.
    Preset(usize),
    #[default]
    None,
    Custom,
}

impl PaletteSelect {
    /// Lenient parse: `"custom"`, or a leading integer clamped into the preset range.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name == "custom" {
            return Some(Self::Custom);
        }
        let digits_end = name
            .char_indices()
            .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
            .map_or(name.len(), |(i, _)| i);
        let idx: i64 = name[..digits_end].parse().ok()?;
        Some(Self::from_index(idx))
    }

    pub fn from_index(idx: i64) -> Self {
        match idx.clamp(0, MAX_PRESET_INDEX as i64) {
            0 => Self::None,
            i => Self::Preset(i as usize),
        }
    }
}

impl fmt::Display for PaletteSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("0"),
            Self::Preset(i) => write!(f, "{i}"),
            Self::Custom => f.write_str("custom"),
        }
    }
}

impl Serialize for PaletteSelect {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PaletteSelect {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_name(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown palette \"{s}\"")))
    }
}

/// Where the sprite comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    #[default]
    Image,
    Text,
}

/// Stops used when the custom palette is missing or unusable.
pub fn default_custom_palette() -> Vec<Rgb8> {
    vec![
        Rgb8::new(0xff, 0x00, 0xff),
        Rgb8::new(0x00, 0xff, 0xff),
        Rgb8::new(0xff, 0xb7, 0x03),
        Rgb8::new(0x00, 0xff, 0x66),
        Rgb8::new(0xff, 0x00, 0x6e),
    ]
}

/// Every user-tunable knob, in its sanitized form.
///
/// JSON keys are camelCase. Build one from untrusted input with
/// [`sanitize`](crate::settings::sanitize::sanitize); `Deserialize` is strict and meant for
/// round-tripping already sanitized files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub canvas_preset: CanvasPreset,
    pub custom_w: u32,
    pub custom_h: u32,

    /// Opacity the previous frame is redrawn at.
    pub alpha_decay: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub anim_speed: f64,
    pub content_scale: f64,

    pub motion_mode: MotionMode,
    pub mode_speed: f64,
    /// Cycle length of the cyclic modes, in seconds.
    pub mode_duration: f64,
    pub mode_amplitude_x: f64,
    pub mode_amplitude_y: f64,

    pub bg_color: Rgb8,
    pub bg_transparent: bool,

    pub palette_select: PaletteSelect,
    pub custom_palette: Vec<Rgb8>,
    pub color_speed: f64,
    pub color_intensity: f64,
    /// Seconds of tinting; `0` is unlimited.
    pub color_duration: f64,

    pub transparency_mode: TransparencyMode,
    pub raster_width: u32,
    pub raster_resize_enabled: bool,
    pub svg_width: u32,
    pub svg_scale_multiplier: u32,

    /// Timed recording length, in seconds.
    pub record_duration: u32,
    pub loop_mode: bool,

    pub input_mode: InputMode,
    pub text_content: String,
    pub text_font_size: u32,
    pub text_font_family: String,
    pub text_color: Rgb8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas_preset: CanvasPreset::default(),
            custom_w: 800,
            custom_h: 600,
            alpha_decay: 0.92,
            offset_x: 1.5,
            offset_y: 0.5,
            anim_speed: 1.0,
            content_scale: 1.0,
            motion_mode: MotionMode::Bounce,
            mode_speed: 2.0,
            mode_duration: 8.0,
            mode_amplitude_x: 0.9,
            mode_amplitude_y: 0.9,
            bg_color: Rgb8::BLACK,
            bg_transparent: false,
            palette_select: PaletteSelect::None,
            custom_palette: default_custom_palette(),
            color_speed: 0.3,
            color_intensity: 0.6,
            color_duration: 0.0,
            transparency_mode: TransparencyMode::None,
            raster_width: 1600,
            raster_resize_enabled: false,
            svg_width: 1200,
            svg_scale_multiplier: 1,
            record_duration: 5,
            loop_mode: false,
            input_mode: InputMode::Image,
            text_content: String::new(),
            text_font_size: 128,
            text_font_family: "sans-serif".to_string(),
            text_color: Rgb8::WHITE,
        }
    }
}

impl Settings {
    pub fn canvas(&self) -> Canvas {
        match self.canvas_preset {
            CanvasPreset::Fixed { width, height } => Canvas::new(width, height),
            CanvasPreset::Custom => Canvas::new(self.custom_w, self.custom_h),
        }
    }

    pub fn background(&self) -> Background {
        if self.bg_transparent {
            Background::Transparent
        } else {
            Background::Solid(self.bg_color)
        }
    }

    /// Active palette stops, or `None` when tinting is off.
    pub fn palette(&self) -> Option<Vec<Rgb8>> {
        match self.palette_select {
            PaletteSelect::None => None,
            PaletteSelect::Preset(i) => presets::preset(i),
            PaletteSelect::Custom => Some(self.custom_palette.clone()),
        }
    }

    /// Motion inputs for a sprite drawn at `sprite_size`.
    pub fn motion_params(&self, sprite_size: (f64, f64)) -> MotionParams {
        let canvas = self.canvas();
        MotionParams {
            mode: self.motion_mode,
            width: f64::from(canvas.width),
            height: f64::from(canvas.height),
            sprite_width: sprite_size.0,
            sprite_height: sprite_size.1,
            amp_x: self.mode_amplitude_x,
            amp_y: self.mode_amplitude_y,
            speed: self.anim_speed,
            mode_speed: self.mode_speed,
            mode_duration: self.mode_duration,
            loop_mode: self.loop_mode,
        }
    }

    pub fn composite_params(&self) -> CompositeParams {
        CompositeParams {
            alpha_decay: self.alpha_decay,
            offset: Vec2::new(self.offset_x, self.offset_y),
            speed: self.anim_speed,
            background: self.background(),
            tint: self.palette().map(|stops| TintParams {
                stops,
                color_speed: self.color_speed,
                intensity: self.color_intensity,
                duration_secs: self.color_duration,
            }),
        }
    }

    pub fn sprite_options(&self) -> SpriteOptions {
        SpriteOptions {
            transparency: self.transparency_mode,
            raster_resize: self.raster_resize_enabled,
            raster_width: self.raster_width,
            svg_width: self.svg_width,
            svg_scale_multiplier: self.svg_scale_multiplier,
        }
    }

    /// Text sprite request for the current text settings.
    pub fn text_spec(&self) -> TextSpec {
        TextSpec {
            content: self.text_content.clone(),
            font_size: self.text_font_size,
            font_family: self.text_font_family.clone(),
            color: self.text_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_from_preset_or_custom() {
        let mut s = Settings::default();
        assert_eq!(s.canvas(), Canvas::new(800, 600));
        s.canvas_preset = CanvasPreset::Custom;
        s.custom_w = 320;
        s.custom_h = 200;
        assert_eq!(s.canvas(), Canvas::new(320, 200));
        assert_eq!(CanvasPreset::from_name("1920,1080").unwrap().to_string(), "1920,1080");
        assert_eq!(CanvasPreset::from_name("640,480"), None);
    }

    #[test]
    fn palette_select_parses_leniently() {
        assert_eq!(PaletteSelect::from_name("custom"), Some(PaletteSelect::Custom));
        assert_eq!(PaletteSelect::from_name("0"), Some(PaletteSelect::None));
        assert_eq!(PaletteSelect::from_name("3"), Some(PaletteSelect::Preset(3)));
        assert_eq!(PaletteSelect::from_name("42"), Some(PaletteSelect::Preset(7)));
        assert_eq!(PaletteSelect::from_name("-2"), Some(PaletteSelect::None));
        assert_eq!(PaletteSelect::from_name("2abc"), Some(PaletteSelect::Preset(2)));
        assert_eq!(PaletteSelect::from_name("abc"), None);
    }

    #[test]
    fn composite_params_follow_palette_and_background() {
        let mut s = Settings::default();
        let p = s.composite_params();
        assert!(p.tint.is_none());
        assert_eq!(p.background, Background::Solid(Rgb8::BLACK));
        assert_eq!(p.offset, Vec2::new(1.5, 0.5));

        s.palette_select = PaletteSelect::Custom;
        s.bg_transparent = true;
        let p = s.composite_params();
        let tint = p.tint.unwrap();
        assert_eq!(tint.stops, default_custom_palette());
        assert_eq!(tint.intensity, 0.6);
        assert_eq!(p.background, Background::Transparent);

        s.palette_select = PaletteSelect::Preset(1);
        assert_eq!(s.palette().unwrap().len(), 6);
    }

    #[test]
    fn motion_params_use_canvas_and_sprite_size() {
        let s = Settings {
            motion_mode: MotionMode::Orbit,
            loop_mode: true,
            ..Settings::default()
        };
        let m = s.motion_params((100.0, 50.0));
        assert_eq!(m.mode, MotionMode::Orbit);
        assert_eq!((m.width, m.height), (800.0, 600.0));
        assert_eq!((m.sprite_width, m.sprite_height), (100.0, 50.0));
        assert_eq!(m.mode_speed, 2.0);
        assert!(m.loop_mode);
    }

    #[test]
    fn serializes_camel_case_keys() {
        let v = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(v["canvasPreset"], "800,600");
        assert_eq!(v["modeAmplitudeX"], 0.9);
        assert_eq!(v["paletteSelect"], "0");
        assert_eq!(v["bgColor"], "#000000");
        assert_eq!(v["motionMode"], "bounce");
        assert_eq!(v["customPalette"][2], "#ffb703");
        let back: Settings = serde_json::from_value(v).unwrap();
        assert_eq!(back, Settings::default());
    }
}
