//! End-to-end composition of decoded module images.

use crate::background::BackgroundModel;
use crate::color::Rgb;
use crate::composite::{composite, flatten};
use crate::embellish::{add_base, add_shadow, BaseOptions, ShadowOptions};
use crate::error::ComposeError;
use crate::normalize::{normalize, normalize_to, scaled_width};
use crate::raster::{check_canvas, RasterImage};
use crate::seam::seam_crop;
use crate::trim::trim;

/// Default padding kept around the trimmed foreground.
pub const DEFAULT_PADDING: u32 = 1;

/// Default limit for the longer side of a decoded image.
pub const DEFAULT_MAX_DIMENSION: u32 = 4000;

/// Resolved options for one [`render`] call.
///
/// Built with chained setters:
///
/// ```
/// use strip_compose::{BackgroundModel, PipelineConfig, Rgb};
///
/// let config = PipelineConfig::new()
///     .trim(BackgroundModel::AlphaThreshold { cutoff: 10 })
///     .padding(0)
///     .seam_crop(5)
///     .background(Some(Rgb::WHITE));
/// assert_eq!(config.seam_crop_width(), 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    trim: BackgroundModel,
    padding: u32,
    seam_crop: u32,
    target_height: Option<u32>,
    overlap: i32,
    background: Option<Rgb>,
    shadow: Option<ShadowOptions>,
    base: Option<BaseOptions>,
    max_dimension: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            trim: BackgroundModel::default(),
            padding: DEFAULT_PADDING,
            seam_crop: 0,
            target_height: None,
            overlap: 0,
            background: Some(Rgb::WHITE),
            shadow: None,
            base: None,
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Background model used by the trimmer.
    pub fn trim(mut self, model: BackgroundModel) -> Self {
        self.trim = model;
        self
    }

    /// Pixels kept around each trimmed foreground box.
    pub fn padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Pixels removed from interior-facing edges.
    pub fn seam_crop(mut self, width: u32) -> Self {
        self.seam_crop = width;
        self
    }

    /// Explicit common height; `None` uses the smallest input height.
    pub fn target_height(mut self, height: Option<u32>) -> Self {
        self.target_height = height.filter(|h| *h > 0);
        self
    }

    /// Signed neighbour overlap. Negative values insert a gap.
    pub fn overlap(mut self, overlap: i32) -> Self {
        self.overlap = overlap;
        self
    }

    /// Final flatten color; `None` keeps transparency.
    pub fn background(mut self, color: Option<Rgb>) -> Self {
        self.background = color;
        self
    }

    pub fn shadow(mut self, options: Option<ShadowOptions>) -> Self {
        self.shadow = options;
        self
    }

    pub fn base(mut self, options: Option<BaseOptions>) -> Self {
        self.base = options;
        self
    }

    /// Longest side allowed before an input is downscaled. 0 disables.
    pub fn max_dimension(mut self, max: u32) -> Self {
        self.max_dimension = max;
        self
    }

    pub fn trim_model(&self) -> &BackgroundModel {
        &self.trim
    }

    pub fn padding_px(&self) -> u32 {
        self.padding
    }

    pub fn seam_crop_width(&self) -> u32 {
        self.seam_crop
    }

    pub fn target(&self) -> Option<u32> {
        self.target_height
    }

    pub fn overlap_px(&self) -> i32 {
        self.overlap
    }

    pub fn background_color(&self) -> Option<Rgb> {
        self.background
    }

    pub fn shadow_options(&self) -> Option<&ShadowOptions> {
        self.shadow.as_ref()
    }

    pub fn base_options(&self) -> Option<&BaseOptions> {
        self.base.as_ref()
    }

    pub fn max_dimension_px(&self) -> u32 {
        self.max_dimension
    }
}

/// Run every stage over `images`, in order:
/// size guard, trim, normalize, seam crop, composite, shadow, base, flatten.
pub fn render(images: Vec<RasterImage>, config: &PipelineConfig) -> Result<RasterImage, ComposeError> {
    if images.is_empty() {
        return Err(ComposeError::EmptyInput);
    }
    let count = images.len();

    let trimmed: Vec<RasterImage> = images
        .into_iter()
        .map(|image| image.fit_within(config.max_dimension))
        .map(|image| trim(image, &config.trim, config.padding))
        .collect();

    let normalized = match config.target_height {
        Some(height) => {
            let projected: u64 = trimmed
                .iter()
                .map(|image| scaled_width(image.width(), image.height(), height))
                .sum();
            check_canvas(projected, height as u64)?;
            normalize_to(trimmed, height)
        }
        None => normalize(trimmed),
    };
    if let Some(first) = normalized.first() {
        tracing::debug!(modules = count, height = first.height(), "Normalized modules");
    }

    let cropped = seam_crop(normalized, config.seam_crop);

    // Flattening waits until after embellishment so the shadow survives.
    let embellish = config.shadow.is_some() || config.base.is_some();
    let background = if embellish { None } else { config.background };
    let mut canvas = composite(cropped, background, config.overlap)?;

    if let Some(shadow) = &config.shadow {
        canvas = add_shadow(canvas, shadow)?;
    }
    if let Some(base) = &config.base {
        canvas = add_base(canvas, base)?;
    }
    if embellish {
        if let Some(color) = config.background {
            canvas = flatten(canvas, color);
        }
    }

    tracing::debug!(
        width = canvas.width(),
        height = canvas.height(),
        "Rendered strip"
    );
    Ok(canvas)
}
