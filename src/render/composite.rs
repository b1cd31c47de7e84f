use crate::foundation::core::Vec2;
use crate::foundation::math::{mul_div255_u16, mul_div255_u8, unit_to_u8};
use crate::palette::color::Rgb8;

pub type PremulRgba8 = [u8; 4];

/// Premultiplied source-over with a global `opacity` in `[0, 1]`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f64) -> PremulRgba8 {
    let op = unit_to_u8(opacity);
    if op == 0 || src[3] == 0 {
        return dst;
    }

    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Source-over of equal-length premultiplied buffers.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f64) {
    debug_assert_eq!(dst.len(), src.len());
    if unit_to_u8(opacity) == 0 {
        return;
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
}

/// Source-atop of a flat `color` at `intensity` onto every covered pixel.
///
/// Destination alpha is preserved and fully transparent pixels are untouched. Color channels
/// saturate at the pixel's own alpha so the buffer stays validly premultiplied.
pub fn tint_atop_in_place(dst: &mut [u8], color: Rgb8, intensity: f64) {
    let sa = unit_to_u8(intensity);
    if sa == 0 {
        return;
    }
    let inv = 255u16 - sa;
    let src = [
        mul_div255_u16(u16::from(color.r), sa),
        mul_div255_u16(u16::from(color.g), sa),
        mul_div255_u16(u16::from(color.b), sa),
    ];

    for d in dst.chunks_exact_mut(4) {
        let da = u16::from(d[3]);
        if da == 0 {
            continue;
        }
        for i in 0..3 {
            let c = mul_div255_u16(src[i], da) + mul_div255_u16(u16::from(d[i]), inv);
            d[i] = c.min(da) as u8;
        }
    }
}

/// Draw `src` translated by `offset` onto `dst` at `opacity`, resampling bilinearly.
///
/// Sample positions falling outside `src` read as transparent. The opacity multiply truncates,
/// so any nonzero pixel strictly loses alpha on every pass when `opacity < 1`.
pub fn decay_shift_into(
    dst: &mut [u8],
    src: &[u8],
    width: u32,
    height: u32,
    offset: Vec2,
    opacity: f64,
) {
    let expected = (width as usize) * (height as usize) * 4;
    debug_assert_eq!(dst.len(), expected);
    debug_assert_eq!(src.len(), expected);
    if dst.len() != expected || src.len() != expected {
        return;
    }
    let op = unit_to_u8(opacity);
    if op == 0 || expected == 0 {
        return;
    }

    // Destination pixel x samples source at x - dx = x + ix + fx.
    let (ix, wx) = split_offset(-offset.x);
    let (iy, wy) = split_offset(-offset.y);
    let weights = [
        (256 - wx) * (256 - wy),
        wx * (256 - wy),
        (256 - wx) * wy,
        wx * wy,
    ];

    let w = i64::from(width);
    let h = i64::from(height);
    let fetch = |x: i64, y: i64| -> [u32; 4] {
        if x < 0 || y < 0 || x >= w || y >= h {
            return [0; 4];
        }
        let i = ((y * w + x) * 4) as usize;
        [
            u32::from(src[i]),
            u32::from(src[i + 1]),
            u32::from(src[i + 2]),
            u32::from(src[i + 3]),
        ]
    };

    for y in 0..h {
        let sy = y + iy;
        if sy + 1 < 0 || sy >= h {
            continue;
        }
        for x in 0..w {
            let sx = x + ix;
            if sx + 1 < 0 || sx >= w {
                continue;
            }
            let taps = [
                fetch(sx, sy),
                fetch(sx + 1, sy),
                fetch(sx, sy + 1),
                fetch(sx + 1, sy + 1),
            ];
            let mut sample = [0u32; 4];
            for (tap, weight) in taps.iter().zip(weights) {
                if weight == 0 {
                    continue;
                }
                for c in 0..4 {
                    sample[c] += tap[c] * weight;
                }
            }
            if sample[3] == 0 {
                continue;
            }

            let i = ((y * w + x) * 4) as usize;
            let sa = scale_trunc(round_fixed(sample[3]), op);
            if sa == 0 {
                continue;
            }
            let inv = 255u16 - u16::from(sa);
            dst[i + 3] = sa.saturating_add(mul_div255_u8(u16::from(dst[i + 3]), inv));
            for c in 0..3 {
                let sc = scale_trunc(round_fixed(sample[c]), op).min(sa);
                let dc = mul_div255_u8(u16::from(dst[i + c]), inv);
                dst[i + c] = sc.saturating_add(dc);
            }
        }
    }
}

/// Split a pixel offset into its integer floor and an 8-bit fractional weight.
fn split_offset(v: f64) -> (i64, u32) {
    if !v.is_finite() {
        return (0, 0);
    }
    let floor = v.floor();
    let frac = ((v - floor) * 256.0).round() as u32;
    if frac >= 256 {
        (floor as i64 + 1, 0)
    } else {
        (floor as i64, frac)
    }
}

fn round_fixed(v: u32) -> u16 {
    (((v + 32_768) >> 16).min(255)) as u16
}

fn scale_trunc(c: u16, op: u16) -> u8 {
    ((u32::from(c) * u32::from(op)) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_opacity_0_is_noop() {
        let dst = [1, 2, 3, 4];
        let src = [200, 200, 200, 200];
        assert_eq!(over(dst, src, 0.0), dst);
    }

    #[test]
    fn over_src_alpha_0_is_noop() {
        let dst = [10, 20, 30, 40];
        let src = [255, 255, 255, 0];
        assert_eq!(over(dst, src, 1.0), dst);
    }

    #[test]
    fn over_src_opaque_replaces_dst() {
        let dst = [0, 0, 0, 255];
        let src = [255, 0, 0, 255];
        assert_eq!(over(dst, src, 1.0), src);
    }

    #[test]
    fn over_dst_transparent_returns_scaled_src() {
        let dst = [0, 0, 0, 0];
        let src = [100, 110, 120, 200];
        assert_eq!(over(dst, src, 1.0), src);
    }

    #[test]
    fn tint_keeps_alpha_and_skips_empty_pixels() {
        let mut buf = vec![0, 0, 0, 0, 0, 0, 0, 200, 100, 100, 100, 255];
        tint_atop_in_place(&mut buf, Rgb8::new(255, 0, 0), 1.0);
        assert_eq!(&buf[0..4], &[0, 0, 0, 0]);
        assert_eq!(&buf[4..8], &[200, 0, 0, 200]);
        assert_eq!(&buf[8..12], &[255, 0, 0, 255]);
    }

    #[test]
    fn tint_partial_intensity_mixes() {
        let mut buf = vec![0, 0, 255, 255];
        tint_atop_in_place(&mut buf, Rgb8::new(255, 0, 0), 0.5);
        assert_eq!(buf[3], 255);
        assert!(buf[0] > 100 && buf[0] < 160);
        assert!(buf[2] > 100 && buf[2] < 160);
    }

    #[test]
    fn tint_zero_intensity_is_noop() {
        let mut buf = vec![10, 20, 30, 40];
        tint_atop_in_place(&mut buf, Rgb8::WHITE, 0.0);
        assert_eq!(buf, vec![10, 20, 30, 40]);
    }

    #[test]
    fn integer_shift_moves_pixels() {
        // 3x1, single opaque pixel in the middle, shifted right by one.
        let src = vec![0, 0, 0, 0, 255, 255, 255, 255, 0, 0, 0, 0];
        let mut dst = vec![0u8; 12];
        decay_shift_into(&mut dst, &src, 3, 1, Vec2::new(1.0, 0.0), 1.0);
        assert_eq!(dst, vec![0, 0, 0, 0, 0, 0, 0, 0, 255, 255, 255, 255]);
    }

    #[test]
    fn shifted_out_pixels_are_dropped() {
        let src = vec![255, 255, 255, 255, 0, 0, 0, 0];
        let mut dst = vec![0u8; 8];
        decay_shift_into(&mut dst, &src, 2, 1, Vec2::new(-1.0, 0.0), 1.0);
        assert_eq!(dst, vec![0u8; 8]);
    }

    #[test]
    fn half_pixel_shift_splits_coverage() {
        let src = vec![0, 0, 0, 0, 200, 200, 200, 200, 0, 0, 0, 0, 0, 0, 0, 0];
        let mut dst = vec![0u8; 16];
        decay_shift_into(&mut dst, &src, 4, 1, Vec2::new(0.5, 0.0), 1.0);
        assert_eq!(dst[7], 100);
        assert_eq!(dst[11], 100);
        assert_eq!(dst[3], 0);
        assert_eq!(dst[15], 0);
    }

    #[test]
    fn decay_strictly_reduces_faint_alpha() {
        let mut a = 6u8;
        for _ in 0..200 {
            let src = vec![a, a, a, a];
            let mut dst = vec![0u8; 4];
            decay_shift_into(&mut dst, &src, 1, 1, Vec2::ZERO, 0.92);
            assert!(dst[3] < a || a == 0);
            a = dst[3];
        }
        assert_eq!(a, 0);
    }

    #[test]
    fn decay_keeps_premultiplied_invariant() {
        let src = vec![90, 40, 10, 90, 255, 255, 0, 255];
        let mut dst = vec![0u8; 8];
        decay_shift_into(&mut dst, &src, 2, 1, Vec2::new(0.3, 0.0), 0.85);
        for px in dst.chunks_exact(4) {
            assert!(px[0] <= px[3] && px[1] <= px[3] && px[2] <= px[3]);
        }
    }
}
