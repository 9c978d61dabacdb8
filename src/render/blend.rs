//! Premultiplied RGBA8 pixel math used by the CPU surface.

use crate::foundation::core::mul_div255;

pub(crate) type PremulRgba8 = [u8; 4];

/// Source-over of a premultiplied `src` onto `dst`, with `src` further scaled by `alpha`.
pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8, alpha: u8) -> PremulRgba8 {
    if alpha == 0 || src[3] == 0 {
        return dst;
    }

    let sa = mul_div255(src[3], alpha);
    if sa == 0 {
        return dst;
    }
    let inv = 255 - sa;

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255(dst[3], inv));
    for i in 0..3 {
        let sc = mul_div255(src[i], alpha);
        let dc = mul_div255(dst[i], inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

pub(crate) fn premultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3];
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = mul_div255(*c, a);
        }
    }
}

pub(crate) fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;
