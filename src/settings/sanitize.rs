use serde_json::{Map, Value};

use crate::assets::bounds::TransparencyMode;
use crate::motion::mode::MotionMode;
use crate::palette::color::{Rgb8, parse_palette_input};
use crate::settings::model::{
    CanvasPreset, InputMode, PaletteSelect, Settings, default_custom_palette,
};

/// Build [`Settings`] from arbitrary JSON. Never fails.
///
/// Numbers (or numeric strings) are clamped into range, anything unusable falls back to the
/// default for that key, and unknown keys are ignored. Non-object input yields the defaults.
pub fn sanitize(input: &Value) -> Settings {
    let empty = Map::new();
    let src = Source(input.as_object().unwrap_or(&empty));
    let d = Settings::default();

    Settings {
        canvas_preset: src
            .str("canvasPreset")
            .and_then(CanvasPreset::from_name)
            .unwrap_or(d.canvas_preset),
        custom_w: src.rounded("customW", d.custom_w, 64, 3840),
        custom_h: src.rounded("customH", d.custom_h, 64, 2160),
        alpha_decay: src.clamped("alphaDecay", d.alpha_decay, 0.5, 0.99),
        offset_x: src.clamped("offsetX", d.offset_x, -8.0, 8.0),
        offset_y: src.clamped("offsetY", d.offset_y, -8.0, 8.0),
        anim_speed: src.clamped("animSpeed", d.anim_speed, 0.1, 4.0),
        content_scale: src.clamped("contentScale", d.content_scale, 0.1, 3.0),
        motion_mode: src
            .str("motionMode")
            .and_then(MotionMode::lookup)
            .unwrap_or(d.motion_mode),
        mode_speed: src.clamped("modeSpeed", d.mode_speed, 0.1, 8.0),
        mode_duration: src.clamped("modeDuration", d.mode_duration, 1.0, 30.0),
        mode_amplitude_x: src.clamped("modeAmplitudeX", d.mode_amplitude_x, 0.1, 1.0),
        mode_amplitude_y: src.clamped("modeAmplitudeY", d.mode_amplitude_y, 0.1, 1.0),
        bg_color: src
            .color("bgColor")
            .or_else(|| src.color("bgColorHex"))
            .unwrap_or(d.bg_color),
        bg_transparent: src.truthy("bgTransparent"),
        palette_select: palette_select(src.get("paletteSelect")).unwrap_or(d.palette_select),
        custom_palette: custom_palette(src.get("customPalette")),
        color_speed: src.clamped("colorSpeed", d.color_speed, 0.01, 2.0),
        color_intensity: src.clamped("colorIntensity", d.color_intensity, 0.0, 1.0),
        color_duration: src.clamped("colorDuration", d.color_duration, 0.0, 30.0),
        transparency_mode: src
            .str("transparencyMode")
            .and_then(TransparencyMode::from_name)
            .unwrap_or(d.transparency_mode),
        raster_width: src.rounded("rasterWidth", d.raster_width, 32, 8192),
        raster_resize_enabled: src.truthy("rasterResizeEnabled"),
        svg_width: src.rounded("svgWidth", d.svg_width, 32, 8192),
        svg_scale_multiplier: src.rounded("svgScaleMultiplier", d.svg_scale_multiplier, 1, 3),
        record_duration: src.rounded("recordDuration", d.record_duration, 1, 120),
        loop_mode: src.truthy("loopMode"),
        input_mode: match src.str("inputMode") {
            Some("text") => InputMode::Text,
            Some("image") => InputMode::Image,
            _ => d.input_mode,
        },
        text_content: src.str("textContent").map(str::to_owned).unwrap_or(d.text_content),
        text_font_size: src.rounded("textFontSize", d.text_font_size, 8, 512),
        text_font_family: src
            .str("textFontFamily")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .unwrap_or(d.text_font_family),
        text_color: src.color("textColor").unwrap_or(d.text_color),
    }
}

struct Source<'a>(&'a Map<String, Value>);

impl Source<'_> {
    fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    fn number(&self, key: &str) -> Option<f64> {
        let v = match self.get(key)? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    0.0
                } else {
                    s.parse().ok()?
                }
            }
            Value::Bool(b) => f64::from(u8::from(*b)),
            _ => return None,
        };
        v.is_finite().then_some(v)
    }

    fn clamped(&self, key: &str, fallback: f64, min: f64, max: f64) -> f64 {
        self.number(key).map_or(fallback, |v| v.clamp(min, max))
    }

    fn rounded(&self, key: &str, fallback: u32, min: u32, max: u32) -> u32 {
        self.number(key)
            .map_or(fallback, |v| v.clamp(f64::from(min), f64::from(max)).round() as u32)
    }

    fn truthy(&self, key: &str) -> bool {
        match self.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(_) | Value::Object(_)) => true,
        }
    }

    fn color(&self, key: &str) -> Option<Rgb8> {
        self.str(key).and_then(Rgb8::from_hex)
    }
}

fn palette_select(value: Option<&Value>) -> Option<PaletteSelect> {
    match value? {
        Value::String(s) => PaletteSelect::from_name(s),
        Value::Number(n) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .map(|v| PaletteSelect::from_index(v.trunc() as i64)),
        _ => None,
    }
}

/// Valid stops from an array or a comma-separated string; at least two or the default.
fn custom_palette(value: Option<&Value>) -> Vec<Rgb8> {
    let stops = match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(Rgb8::from_hex)
            .collect(),
        Some(Value::String(s)) => parse_palette_input(s),
        _ => Vec::new(),
    };
    if stops.len() >= 2 {
        stops
    } else {
        default_custom_palette()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_objects_yield_defaults() {
        assert_eq!(sanitize(&json!(null)), Settings::default());
        assert_eq!(sanitize(&json!([1, 2])), Settings::default());
        assert_eq!(sanitize(&json!({})), Settings::default());
    }

    #[test]
    fn numbers_are_clamped_and_rounded() {
        let s = sanitize(&json!({
            "customW": 10,
            "customH": "1000.6",
            "alphaDecay": 1.5,
            "offsetX": -20,
            "animSpeed": "fast",
            "modeDuration": 0,
            "svgScaleMultiplier": 2.4,
            "recordDuration": 500,
            "textFontSize": 3,
            "colorIntensity": null
        }));
        assert_eq!(s.custom_w, 64);
        assert_eq!(s.custom_h, 1001);
        assert_eq!(s.alpha_decay, 0.99);
        assert_eq!(s.offset_x, -8.0);
        assert_eq!(s.anim_speed, 1.0);
        assert_eq!(s.mode_duration, 1.0);
        assert_eq!(s.svg_scale_multiplier, 2);
        assert_eq!(s.record_duration, 120);
        assert_eq!(s.text_font_size, 8);
        assert_eq!(s.color_intensity, 0.6);
    }

    #[test]
    fn enumerations_fall_back_to_defaults() {
        let s = sanitize(&json!({
            "canvasPreset": "640,480",
            "motionMode": "wobble",
            "transparencyMode": "green",
            "inputMode": "video"
        }));
        assert_eq!(s.canvas_preset, CanvasPreset::default());
        assert_eq!(s.motion_mode, MotionMode::Bounce);
        assert_eq!(s.transparency_mode, TransparencyMode::None);
        assert_eq!(s.input_mode, InputMode::Image);

        let s = sanitize(&json!({
            "canvasPreset": "custom",
            "motionMode": "lissajous",
            "transparencyMode": "white",
            "inputMode": "text"
        }));
        assert_eq!(s.canvas_preset, CanvasPreset::Custom);
        assert_eq!(s.motion_mode, MotionMode::Lissajous);
        assert_eq!(s.transparency_mode, TransparencyMode::White);
        assert_eq!(s.input_mode, InputMode::Text);
    }

    #[test]
    fn colors_and_palettes_are_normalized() {
        let s = sanitize(&json!({
            "bgColor": "nope",
            "bgColorHex": "0F0",
            "paletteSelect": 99,
            "customPalette": ["#ABC", "bad", "123456"],
            "textColor": "#ff0000"
        }));
        assert_eq!(s.bg_color, Rgb8::new(0, 255, 0));
        assert_eq!(s.palette_select, PaletteSelect::Preset(7));
        assert_eq!(
            s.custom_palette,
            vec![Rgb8::new(0xaa, 0xbb, 0xcc), Rgb8::new(0x12, 0x34, 0x56)]
        );
        assert_eq!(s.text_color, Rgb8::new(255, 0, 0));

        let s = sanitize(&json!({ "customPalette": "#fff", "paletteSelect": "custom" }));
        assert_eq!(s.custom_palette, default_custom_palette());
        assert_eq!(s.palette_select, PaletteSelect::Custom);

        let s = sanitize(&json!({ "customPalette": "#000, #fff" }));
        assert_eq!(s.custom_palette, vec![Rgb8::BLACK, Rgb8::WHITE]);
    }

    #[test]
    fn flags_use_truthiness() {
        let s = sanitize(&json!({
            "bgTransparent": 1,
            "rasterResizeEnabled": "yes",
            "loopMode": 0
        }));
        assert!(s.bg_transparent);
        assert!(s.raster_resize_enabled);
        assert!(!s.loop_mode);
    }

    #[test]
    fn sanitizing_is_idempotent() {
        let once = sanitize(&json!({
            "customW": 1234.4,
            "alphaDecay": 0.3,
            "paletteSelect": "4",
            "textFontFamily": "  serif ",
            "textContent": "hi"
        }));
        let twice = sanitize(&serde_json::to_value(&once).unwrap());
        assert_eq!(once, twice);
        assert_eq!(once.text_font_family, "serif");
    }
}
