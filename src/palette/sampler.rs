use crate::palette::color::Rgb8;

/// Sample a cyclic gradient at `phase`.
///
/// Only the fractional part of `phase` matters (negative phases wrap). The wrapped fraction is
/// scaled by the stop count and linearly interpolated between neighbouring stops, with the last
/// stop blending back into the first. Each channel is rounded independently.
///
/// Returns `None` when `stops` is empty, which callers treat as "no tint this frame".
pub fn sample(stops: &[Rgb8], phase: f64) -> Option<Rgb8> {
    if stops.is_empty() || !phase.is_finite() {
        return None;
    }

    let n = stops.len();
    let frac = ((phase % 1.0) + 1.0) % 1.0;
    let s = frac * n as f64;
    let i = s.floor();
    let weight = s - i;
    let i = i as usize;

    Some(lerp_rgb(stops[i % n], stops[(i + 1) % n], weight))
}

fn lerp_rgb(a: Rgb8, b: Rgb8, t: f64) -> Rgb8 {
    fn ch(a: u8, b: u8, t: f64) -> u8 {
        let (a, b) = (f64::from(a), f64::from(b));
        (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
    }
    Rgb8::new(ch(a.r, b.r, t), ch(a.g, b.g, t), ch(a.b, b.b, t))
}
