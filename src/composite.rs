//! Per-pixel compositing primitives shared by the pixel-level effects.
//!
//! All buffers are straight-alpha RGBA8. Every primitive keeps the
//! dimensions of its first input and saturates channels to `[0, 255]`.

use crate::{
    foundation::error::{FxError, FxResult},
    foundation::math::mul_div255,
    frames::PixelBuffer,
};

pub type Rgba8 = [u8; 4];

/// Multiply every channel (alpha included) by `m`, rounding half away from zero.
pub fn scale(px: Rgba8, m: f32) -> Rgba8 {
    let m = if m.is_finite() { m.max(0.0) } else { 0.0 };
    px.map(|c| (f32::from(c) * m).round().clamp(0.0, 255.0) as u8)
}

pub fn scale_in_place(buf: &mut PixelBuffer, m: f32) {
    if m == 1.0 {
        return;
    }
    for px in buf.data_mut().chunks_exact_mut(4) {
        let out = scale([px[0], px[1], px[2], px[3]], m);
        px.copy_from_slice(&out);
    }
}

/// `a * (1 - t) + b * t` per channel, with `t` quantised to 1/255 steps.
pub fn crossfade(a: Rgba8, b: Rgba8, t: f32) -> Rgba8 {
    let t = t.clamp(0.0, 1.0);
    let tt = ((t * 255.0).round() as i32).clamp(0, 255) as u16;
    let it = 255u16 - tt;

    let mut out = [0u8; 4];
    for i in 0..4 {
        let av = mul_div255(u16::from(a[i]), it);
        let bv = mul_div255(u16::from(b[i]), tt);
        out[i] = (av + bv).min(255) as u8;
    }
    out
}

/// Blend `b` into `a` with weight `t` for `b`.
pub fn crossfade_in_place(a: &mut PixelBuffer, b: &PixelBuffer, t: f32) -> FxResult<()> {
    if !a.same_size(b) {
        return Err(FxError::validation(format!(
            "crossfade expects equal-size buffers, got {}x{} and {}x{}",
            a.width(),
            a.height(),
            b.width(),
            b.height()
        )));
    }
    for (d, s) in a.data_mut().chunks_exact_mut(4).zip(b.data().chunks_exact(4)) {
        let out = crossfade([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], t);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Per-channel arithmetic mean of `buffers`, rounded to nearest, alpha forced opaque.
pub fn mean_opaque<'a, I>(buffers: I) -> FxResult<PixelBuffer>
where
    I: IntoIterator<Item = &'a PixelBuffer>,
{
    let mut iter = buffers.into_iter();
    let first = iter
        .next()
        .ok_or_else(|| FxError::validation("mean_opaque expects at least one buffer"))?;

    let mut acc: Vec<u32> = first.data().iter().map(|&c| u32::from(c)).collect();
    let mut n = 1u32;
    for buf in iter {
        if !buf.same_size(first) {
            return Err(FxError::validation("mean_opaque expects equal-size buffers"));
        }
        for (a, &c) in acc.iter_mut().zip(buf.data()) {
            *a += u32::from(c);
        }
        n += 1;
    }

    let mut out = PixelBuffer::new(first.width(), first.height())?;
    for (px, sums) in out.data_mut().chunks_exact_mut(4).zip(acc.chunks_exact(4)) {
        for c in 0..3 {
            px[c] = ((sums[c] + n / 2) / n).min(255) as u8;
        }
        px[3] = 255;
    }
    Ok(out)
}

/// Source rectangle in pixel units; may have fractional origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Bilinearly resample `crop` of `src` onto a canvas the size of `src`.
///
/// Uses pixel-centre mapping, so a full-size crop at the origin is an exact copy.
pub fn sample_crop_scaled(src: &PixelBuffer, crop: CropRect) -> FxResult<PixelBuffer> {
    let (w, h) = (src.width(), src.height());
    let fits = crop.x >= 0.0
        && crop.y >= 0.0
        && crop.width > 0.0
        && crop.height > 0.0
        && crop.x + crop.width <= f64::from(w) + 1e-9
        && crop.y + crop.height <= f64::from(h) + 1e-9;
    if !fits {
        return Err(FxError::validation(format!(
            "crop {crop:?} does not fit inside {w}x{h}"
        )));
    }

    let sx_scale = crop.width / f64::from(w);
    let sy_scale = crop.height / f64::from(h);
    let mut out = PixelBuffer::new(w, h)?;
    let data = src.data();
    let stride = w as usize * 4;

    for y in 0..h {
        let sy = (crop.y + (f64::from(y) + 0.5) * sy_scale - 0.5).max(0.0);
        let y0 = (sy.floor() as u32).min(h - 1);
        let y1 = (y0 + 1).min(h - 1);
        let fy = (sy - f64::from(y0)).clamp(0.0, 1.0);

        for x in 0..w {
            let sx = (crop.x + (f64::from(x) + 0.5) * sx_scale - 0.5).max(0.0);
            let x0 = (sx.floor() as u32).min(w - 1);
            let x1 = (x0 + 1).min(w - 1);
            let fx = (sx - f64::from(x0)).clamp(0.0, 1.0);

            let i00 = y0 as usize * stride + x0 as usize * 4;
            let i10 = y0 as usize * stride + x1 as usize * 4;
            let i01 = y1 as usize * stride + x0 as usize * 4;
            let i11 = y1 as usize * stride + x1 as usize * 4;

            let mut px = [0u8; 4];
            for c in 0..4 {
                let top = f64::from(data[i00 + c]) * (1.0 - fx) + f64::from(data[i10 + c]) * fx;
                let bottom =
                    f64::from(data[i01 + c]) * (1.0 - fx) + f64::from(data[i11 + c]) * fx;
                let v = top * (1.0 - fy) + bottom * fy;
                px[c] = v.round().clamp(0.0, 255.0) as u8;
            }
            out.set_pixel(x, y, px);
        }
    }
    Ok(out)
}
