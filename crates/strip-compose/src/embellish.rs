//! Synthetic drop shadow and base strip.
//!
//! Both are rasterized with tiny-skia onto a transparent surface and the
//! module canvas is then composited over them, so content always stays on
//! top.

use image::{imageops, RgbaImage};
use tiny_skia::{FillRule, Mask, Paint, Path, PathBuilder, Pixmap, Rect, Transform};

use crate::color::Rgb;
use crate::composite::paste_over;
use crate::error::ComposeError;
use crate::raster::{check_canvas, ColorMode, RasterImage};

/// Parameters for [`add_shadow`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ShadowOptions {
    /// Height of the elliptical shadow band in pixels
    pub band_height: u32,
    /// Gaussian blur sigma; 0 leaves the ellipse sharp
    pub blur_radius: f32,
    /// Peak opacity in `[0, 1]`
    pub opacity: f32,
    /// Vertical shift of the band; negative moves it up
    pub offset_y: i32,
    /// Shadow color
    pub color: Rgb,
}

impl Default for ShadowOptions {
    fn default() -> Self {
        Self {
            band_height: 24,
            blur_radius: 8.0,
            opacity: 0.35,
            offset_y: -6,
            color: Rgb::BLACK,
        }
    }
}

/// Parameters for [`add_base`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BaseOptions {
    /// Rows added below the canvas
    pub height: u32,
    /// Horizontal inset of the bar on each side
    pub side_margin: u32,
    /// Corner radius; 0 draws a plain rectangle
    pub corner_radius: f32,
    /// Bar color
    pub fill: Rgb,
    /// Color of the line along the top of the bar
    pub edge: Rgb,
    /// Thickness of the top line; 0 disables it
    pub edge_thickness: u32,
}

impl Default for BaseOptions {
    fn default() -> Self {
        Self {
            height: 24,
            side_margin: 8,
            corner_radius: 4.0,
            fill: Rgb::new(224, 224, 224),
            edge: Rgb::new(160, 160, 160),
            edge_thickness: 2,
        }
    }
}

/// Draw a soft elliptical shadow across the bottom of `canvas`, beneath
/// its content. Dimensions are unchanged.
pub fn add_shadow(canvas: RasterImage, options: &ShadowOptions) -> Result<RasterImage, ComposeError> {
    let (width, height) = canvas.dimensions();
    let band = options.band_height.min(height);
    let opacity = options.opacity.clamp(0.0, 1.0);
    if band == 0 || opacity == 0.0 {
        return Ok(canvas);
    }

    let mut pixmap = new_pixmap(width, height)?;
    let blur = options.blur_radius.max(0.0);
    // Pull the ellipse in from the sides so the blur fades out on canvas.
    let inset = blur.min(width as f32 / 4.0);
    let top = height as f32 - band as f32 + options.offset_y as f32;
    let oval = Rect::from_xywh(inset, top, width as f32 - 2.0 * inset, band as f32)
        .and_then(PathBuilder::from_oval);
    if let Some(path) = oval {
        let mut paint = Paint::default();
        let c = options.color;
        paint.set_color_rgba8(c.r, c.g, c.b, (opacity * 255.0).round() as u8);
        paint.anti_alias = true;
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    let mut shadow = pixmap_to_rgba(&pixmap)?;
    // Transparent texels carry the shadow color so blurring does not
    // darken the fringe of non-black shadows.
    for px in shadow.pixels_mut() {
        if px.0[3] == 0 {
            px.0 = [options.color.r, options.color.g, options.color.b, 0];
        }
    }
    if blur > 0.0 {
        shadow = imageops::blur(&shadow, blur);
    }

    let mode = canvas.mode();
    paste_over(&mut shadow, canvas.as_rgba(), 0, 0);
    tracing::trace!(width, height, band, blur, "Added shadow");
    Ok(RasterImage::from_rgba(shadow).with_mode(mode))
}

/// Extend `canvas` downwards by `options.height` rows holding a rounded
/// base bar. Width is unchanged.
pub fn add_base(canvas: RasterImage, options: &BaseOptions) -> Result<RasterImage, ComposeError> {
    if options.height == 0 {
        return Ok(canvas);
    }
    let (width, content_height) = canvas.dimensions();
    let (width, height) =
        check_canvas(width as u64, content_height as u64 + options.height as u64)?;

    let mut pixmap = new_pixmap(width, height)?;
    let margin = options.side_margin.min(width.saturating_sub(1) / 2);
    let bar_x = margin as f32;
    let bar_y = content_height as f32;
    let bar_w = (width - 2 * margin) as f32;
    let bar_h = options.height as f32;
    let radius = options
        .corner_radius
        .max(0.0)
        .min(bar_w / 2.0)
        .min(bar_h / 2.0);

    if let Some(bar) = rounded_rect(bar_x, bar_y, bar_w, bar_h, radius) {
        let mut paint = Paint::default();
        paint.set_color_rgba8(options.fill.r, options.fill.g, options.fill.b, 255);
        paint.anti_alias = true;
        pixmap.fill_path(&bar, &paint, FillRule::Winding, Transform::identity(), None);

        let thickness = options.edge_thickness.min(options.height);
        if thickness > 0 {
            let mut mask = Mask::new(width, height).ok_or(ComposeError::Allocation { width, height })?;
            mask.fill_path(&bar, FillRule::Winding, true, Transform::identity());
            if let Some(line) = Rect::from_xywh(bar_x, bar_y, bar_w, thickness as f32) {
                paint.set_color_rgba8(options.edge.r, options.edge.g, options.edge.b, 255);
                pixmap.fill_rect(line, &paint, Transform::identity(), Some(&mask));
            }
        }
    }

    let mut out = pixmap_to_rgba(&pixmap)?;
    paste_over(&mut out, canvas.as_rgba(), 0, 0);
    tracing::trace!(width, height, margin, "Added base");
    Ok(RasterImage::from_rgba(out).with_mode(ColorMode::Rgba))
}

fn new_pixmap(width: u32, height: u32) -> Result<Pixmap, ComposeError> {
    Pixmap::new(width, height).ok_or(ComposeError::Allocation { width, height })
}

fn pixmap_to_rgba(pixmap: &Pixmap) -> Result<RgbaImage, ComposeError> {
    let data = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data).ok_or(ComposeError::Allocation {
        width: pixmap.width(),
        height: pixmap.height(),
    })
}

fn rounded_rect(x: f32, y: f32, w: f32, h: f32, r: f32) -> Option<Path> {
    let rect = Rect::from_xywh(x, y, w, h)?;
    if r <= 0.0 {
        return Some(PathBuilder::from_rect(rect));
    }
    let (right, bottom) = (x + w, y + h);
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(right - r, y);
    pb.quad_to(right, y, right, y + r);
    pb.line_to(right, bottom - r);
    pb.quad_to(right, bottom, right - r, bottom);
    pb.line_to(x + r, bottom);
    pb.quad_to(x, bottom, x, bottom - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}
