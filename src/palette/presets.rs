use crate::palette::color::Rgb8;

/// Built-in palettes by index. Index 0 disables tinting.
const PRESETS: [Option<[&str; 6]>; 8] = [
    None,
    Some(["#ff00ff", "#00ffff", "#ff0066", "#66ff00", "#ffff00", "#0066ff"]),
    Some(["#ff4500", "#ff6347", "#ff8c00", "#ffd700", "#ff1493", "#dc143c"]),
    Some(["#001f3f", "#0074D9", "#7FDBFF", "#39CCCC", "#01FF70", "#2ECC40"]),
    Some(["#ff71ce", "#01cdfe", "#05ffa1", "#b967ff", "#fffb96", "#f3baff"]),
    Some(["#ff0000", "#ff3300", "#ff6600", "#ff9900", "#ffcc00", "#ffffff"]),
    Some(["#00c9ff", "#92fe9d", "#f9d423", "#ff4e50", "#a044ff", "#00f2fe"]),
    Some(["#ffffff", "#cccccc", "#999999", "#666666", "#cccccc", "#ffffff"]),
];

/// Highest valid preset index.
pub const MAX_PRESET_INDEX: usize = PRESETS.len() - 1;

/// Stops of preset `index`, or `None` for "no tint" and out-of-range indices.
pub fn preset(index: usize) -> Option<Vec<Rgb8>> {
    let hexes = PRESETS.get(index).copied().flatten()?;
    Some(hexes.iter().filter_map(|h| Rgb8::from_hex(h)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_zero_means_no_tint() {
        assert_eq!(preset(0), None);
        assert_eq!(preset(MAX_PRESET_INDEX + 1), None);
    }

    #[test]
    fn every_preset_parses_fully() {
        for i in 1..=MAX_PRESET_INDEX {
            let stops = preset(i).unwrap();
            assert_eq!(stops.len(), 6, "preset {i}");
        }
        assert_eq!(preset(3).unwrap()[1], Rgb8::new(0x00, 0x74, 0xd9));
    }
}
