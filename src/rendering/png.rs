use std::io::Cursor;
use strip_compose::{ColorMode, RasterImage};

use crate::error::RenderError;

/// Encode `image` as an 8-bit RGB or RGBA PNG, matching its color mode.
///
/// With `optimize` the data is written with fast settings and then
/// re-compressed by oxipng; if oxipng fails the fast encoding is kept.
pub fn encode_png(image: &RasterImage, optimize: bool) -> Result<Vec<u8>, RenderError> {
    let color_type = match image.mode() {
        ColorMode::Rgb => png::ColorType::Rgb,
        ColorMode::Rgba => png::ColorType::Rgba,
    };
    let data = image.to_channel_bytes();

    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, image.width(), image.height());
        encoder.set_color(color_type);
        encoder.set_depth(png::BitDepth::Eight);
        if optimize {
            encoder.set_compression(png::Compression::Fast);
            encoder.set_filter(png::FilterType::NoFilter);
        } else {
            encoder.set_compression(png::Compression::Default);
            encoder.set_adaptive_filter(png::AdaptiveFilterType::Adaptive);
        }
        let mut writer = encoder
            .write_header()
            .map_err(|e| RenderError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(&data)
            .map_err(|e| RenderError::PngEncode(e.to_string()))?;
    }
    let png_bytes = buf.into_inner();

    if !optimize {
        return Ok(png_bytes);
    }

    let before = png_bytes.len();
    let optimized = oxipng::optimize_from_memory(
        &png_bytes,
        &oxipng::Options {
            strip: oxipng::StripChunks::Safe,
            optimize_alpha: false,
            ..Default::default()
        },
    )
    .unwrap_or(png_bytes);
    tracing::debug!(before, after = optimized.len(), "Re-compressed PNG");
    Ok(optimized)
}
