//! The pipeline's image value type.
//!
//! [`RasterImage`] owns an RGBA pixel buffer together with the color mode
//! of its source. RGB sources are stored with alpha 255 everywhere and keep
//! reporting [`ColorMode::Rgb`] so the encoder can drop the alpha channel.
//!
//! Every operation that changes pixels returns a new `RasterImage` backed
//! by a fresh buffer; nothing hands out mutable access to an existing one.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbImage, RgbaImage};

use crate::bbox::BoundingBox;
use crate::error::ComposeError;

/// Largest surface, in pixels, any stage will allocate (1 GiB as RGBA).
pub const MAX_CANVAS_PIXELS: u64 = 1 << 28;

/// Check a `width` x `height` surface against [`MAX_CANVAS_PIXELS`] before
/// allocating it. Returns the dimensions as `u32`.
pub fn check_canvas(width: u64, height: u64) -> Result<(u32, u32), ComposeError> {
    let too_large = || ComposeError::Allocation {
        width: u32::try_from(width).unwrap_or(u32::MAX),
        height: u32::try_from(height).unwrap_or(u32::MAX),
    };
    if width.saturating_mul(height) > MAX_CANVAS_PIXELS {
        return Err(too_large());
    }
    let w = u32::try_from(width).map_err(|_| too_large())?;
    let h = u32::try_from(height).map_err(|_| too_large())?;
    Ok((w, h))
}

/// Channel layout of a [`RasterImage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Opaque RGB, no alpha channel
    Rgb,
    /// RGB with per-pixel alpha
    Rgba,
}

/// An owned, immutable raster image.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pixels: RgbaImage,
    mode: ColorMode,
}

impl RasterImage {
    /// Wrap an RGBA buffer.
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            pixels,
            mode: ColorMode::Rgba,
        }
    }

    /// Wrap an RGB buffer (stored as opaque RGBA).
    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self {
            pixels: DynamicImage::ImageRgb8(pixels).into_rgba8(),
            mode: ColorMode::Rgb,
        }
    }

    /// Build an RGBA image from raw `[R, G, B, A, ...]` bytes.
    ///
    /// Returns `None` if the buffer length does not match the dimensions.
    pub fn from_raw_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(width, height, data).map(Self::from_rgba)
    }

    /// Convert a decoded image, keeping track of whether it had alpha.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let mode = if image.color().has_alpha() {
            ColorMode::Rgba
        } else {
            ColorMode::Rgb
        };
        Self {
            pixels: image.into_rgba8(),
            mode,
        }
    }

    /// Decode PNG/JPEG/WEBP/GIF bytes.
    ///
    /// Zero-sized images are rejected so every pipeline value has at
    /// least one pixel.
    pub fn decode(bytes: &[u8]) -> Result<Self, ComposeError> {
        let image =
            image::load_from_memory(bytes).map_err(|e| ComposeError::Decode(e.to_string()))?;
        if image.width() == 0 || image.height() == 0 {
            return Err(ComposeError::EmptyImage {
                width: image.width(),
                height: image.height(),
            });
        }
        Ok(Self::from_dynamic(image))
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    #[inline]
    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.mode == ColorMode::Rgba
    }

    /// Pixel at `(x, y)`. Panics when out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.pixels.get_pixel(x, y)
    }

    /// Borrow the underlying RGBA buffer.
    #[inline]
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Take the underlying RGBA buffer.
    #[inline]
    pub fn into_rgba(self) -> RgbaImage {
        self.pixels
    }

    /// Bounding box of the full image.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::full(self.width(), self.height())
    }

    /// Copy the region under `bbox` into a new image with the same mode.
    ///
    /// The box is clamped to the image; a box entirely outside the image
    /// yields a clone.
    pub fn crop(&self, bbox: BoundingBox) -> Self {
        let right = bbox.right().min(self.width());
        let bottom = bbox.bottom().min(self.height());
        if bbox.left() >= right || bbox.top() >= bottom {
            return self.clone();
        }
        let region = imageops::crop_imm(
            &self.pixels,
            bbox.left(),
            bbox.top(),
            right - bbox.left(),
            bottom - bbox.top(),
        )
        .to_image();
        Self {
            pixels: region,
            mode: self.mode,
        }
    }

    /// Lanczos3 resample to exactly `width` x `height` (each floored at 1).
    pub fn resize(&self, width: u32, height: u32) -> Self {
        let pixels = imageops::resize(
            &self.pixels,
            width.max(1),
            height.max(1),
            FilterType::Lanczos3,
        );
        Self {
            pixels,
            mode: self.mode,
        }
    }

    /// Downscale so the longer side is at most `max_side`, keeping the
    /// aspect ratio. Images already within the limit are returned as is.
    pub fn fit_within(self, max_side: u32) -> Self {
        let (width, height) = self.dimensions();
        let longest = width.max(height);
        if max_side == 0 || longest <= max_side {
            return self;
        }
        let scale = max_side as f64 / longest as f64;
        let new_width = ((width as f64 * scale).round() as u32).max(1);
        let new_height = ((height as f64 * scale).round() as u32).max(1);
        tracing::debug!(
            from_width = width,
            from_height = height,
            to_width = new_width,
            to_height = new_height,
            "Downscaling oversized image"
        );
        self.resize(new_width, new_height)
    }

    /// Raw pixel bytes in the image's own channel layout
    /// (`RGB` triples for [`ColorMode::Rgb`], `RGBA` quads otherwise).
    pub fn to_channel_bytes(&self) -> Vec<u8> {
        match self.mode {
            ColorMode::Rgba => self.pixels.as_raw().clone(),
            ColorMode::Rgb => self
                .pixels
                .as_raw()
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect(),
        }
    }

    /// Same pixels, tagged with a different mode.
    pub(crate) fn with_mode(self, mode: ColorMode) -> Self {
        Self {
            pixels: self.pixels,
            mode,
        }
    }
}
