//! Background detection models used by the trimmer.

use image::Rgba;

use crate::color::Rgb;
use crate::raster::RasterImage;

/// Default color distance under which a pixel counts as background.
pub const DEFAULT_TOLERANCE: f32 = 18.0;

/// Default alpha at or below which a pixel counts as background.
pub const DEFAULT_ALPHA_CUTOFF: u8 = 10;

/// How "background" is told apart from module content.
///
/// Callers pick a variant by value; [`BackgroundModel::classifier`]
/// resolves it against a concrete image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundModel {
    /// Pixels within `tolerance` (Euclidean RGB) of `color` are background.
    /// Fully transparent pixels are always background.
    FixedColorThreshold { color: Rgb, tolerance: f32 },
    /// Like `FixedColorThreshold`, with the color taken as the mean of the
    /// image's non-transparent corner pixels.
    CornerSampledThreshold { tolerance: f32 },
    /// Pixels with alpha `<= cutoff` are background; color is ignored.
    AlphaThreshold { cutoff: u8 },
}

impl Default for BackgroundModel {
    fn default() -> Self {
        BackgroundModel::FixedColorThreshold {
            color: Rgb::WHITE,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl BackgroundModel {
    /// Resolve the model for one image.
    pub fn classifier(&self, image: &RasterImage) -> Classifier {
        match *self {
            BackgroundModel::FixedColorThreshold { color, tolerance } => {
                Classifier::color(color, tolerance)
            }
            BackgroundModel::CornerSampledThreshold { tolerance } => {
                Classifier::color(sample_corners(image), tolerance)
            }
            BackgroundModel::AlphaThreshold { cutoff } => Classifier::Alpha { cutoff },
        }
    }
}

/// A [`BackgroundModel`] bound to a concrete background color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classifier {
    Color { color: Rgb, tolerance_sq: f32 },
    Alpha { cutoff: u8 },
}

impl Classifier {
    fn color(color: Rgb, tolerance: f32) -> Self {
        let tolerance = if tolerance.is_finite() {
            tolerance.max(0.0)
        } else {
            0.0
        };
        Classifier::Color {
            color,
            tolerance_sq: tolerance * tolerance,
        }
    }

    /// Whether `pixel` is module content rather than background.
    #[inline]
    pub fn is_foreground(&self, pixel: Rgba<u8>) -> bool {
        match *self {
            Classifier::Alpha { cutoff } => pixel.0[3] > cutoff,
            Classifier::Color {
                color,
                tolerance_sq,
            } => pixel.0[3] != 0 && Rgb::from_pixel(pixel).distance_squared(color) > tolerance_sq,
        }
    }
}

/// Mean RGB of the corner pixels that are not fully transparent.
///
/// Falls back to white when every corner is transparent.
pub fn sample_corners(image: &RasterImage) -> Rgb {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Rgb::WHITE;
    }
    let (right, bottom) = (width - 1, height - 1);
    let corners = [(0, 0), (right, 0), (0, bottom), (right, bottom)];

    let mut sum = [0u32; 3];
    let mut count = 0u32;
    for (x, y) in corners {
        let px = image.pixel(x, y);
        if px.0[3] == 0 {
            continue;
        }
        sum[0] += px.0[0] as u32;
        sum[1] += px.0[1] as u32;
        sum[2] += px.0[2] as u32;
        count += 1;
    }
    if count == 0 {
        return Rgb::WHITE;
    }
    let mean = |s: u32| ((s + count / 2) / count) as u8;
    Rgb::new(mean(sum[0]), mean(sum[1]), mean(sum[2]))
}
