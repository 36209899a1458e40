//! Left-to-right alpha compositing.

use image::{Rgba, RgbaImage};

use crate::color::Rgb;
use crate::error::ComposeError;
use crate::raster::{check_canvas, ColorMode, RasterImage};

/// Blend `src` over `dst` (straight alpha, Porter-Duff "over").
#[inline]
pub fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = src.0[3];
    if sa == 0 {
        return;
    }
    if sa == 255 || dst.0[3] == 0 {
        *dst = src;
        return;
    }

    let sa = sa as f32 / 255.0;
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let mut out = [0u8; 4];
    for c in 0..3 {
        let v = (src.0[c] as f32 * sa + dst.0[c] as f32 * da * (1.0 - sa)) / out_a;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    *dst = Rgba(out);
}

/// Alpha-blend `top` onto `canvas` with its top-left corner at `(x, y)`.
/// Parts falling outside the canvas are clipped.
pub fn paste_over(canvas: &mut RgbaImage, top: &RgbaImage, x: i64, y: i64) {
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);
    for (tx, ty, pixel) in top.enumerate_pixels() {
        let cx = x + tx as i64;
        let cy = y + ty as i64;
        if cx < 0 || cy < 0 || cx >= cw || cy >= ch {
            continue;
        }
        blend_over(canvas.get_pixel_mut(cx as u32, cy as u32), *pixel);
    }
}

/// Flatten `image` onto an opaque `background`, using each pixel's alpha
/// as the blend mask. The result is an RGB image.
pub fn flatten(image: RasterImage, background: Rgb) -> RasterImage {
    let mut pixels = image.into_rgba();
    for pixel in pixels.pixels_mut() {
        let mut base = background.with_alpha(255);
        blend_over(&mut base, *pixel);
        *pixel = base;
    }
    RasterImage::from_rgba(pixels).with_mode(ColorMode::Rgb)
}

/// Join `images` left to right on one canvas.
///
/// `overlap` shifts each module left by that many pixels so neighbours
/// share columns; a negative value leaves a gap instead. Positive overlap
/// is clamped below the narrowest module width so the cursor always
/// advances. Modules are bottom-aligned, which is `y = 0` once they have
/// been normalized. With `background` set the canvas is flattened onto it.
/// A canvas larger than [`MAX_CANVAS_PIXELS`](crate::MAX_CANVAS_PIXELS) is
/// refused with [`ComposeError::Allocation`].
pub fn composite(
    images: Vec<RasterImage>,
    background: Option<Rgb>,
    overlap: i32,
) -> Result<RasterImage, ComposeError> {
    let count = images.len();
    let min_width = images
        .iter()
        .map(RasterImage::width)
        .min()
        .ok_or(ComposeError::EmptyInput)?;

    if count == 1 && background.is_none() {
        return images.into_iter().next().ok_or(ComposeError::EmptyInput);
    }

    let overlap = effective_overlap(overlap, min_width) as i64;
    let height = images.iter().map(RasterImage::height).max().unwrap_or(1);
    let total: i64 = images.iter().map(|img| img.width() as i64).sum::<i64>()
        - overlap * (count as i64 - 1);
    let (width, height) = check_canvas(total.max(1) as u64, height as u64)?;

    let mut canvas = RgbaImage::new(width, height);
    let mut cursor: i64 = 0;
    for image in &images {
        let y = (height - image.height()) as i64;
        paste_over(&mut canvas, image.as_rgba(), cursor, y);
        cursor += image.width() as i64 - overlap;
    }

    tracing::debug!(modules = count, width, height, overlap, "Composited modules");

    let canvas = RasterImage::from_rgba(canvas);
    Ok(match background {
        Some(color) => flatten(canvas, color),
        None => canvas,
    })
}

fn effective_overlap(overlap: i32, min_width: u32) -> i32 {
    if overlap <= 0 {
        return overlap;
    }
    let limit = i32::try_from(min_width.saturating_sub(1)).unwrap_or(i32::MAX);
    overlap.min(limit)
}
