use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use strip_compose::{BackgroundModel, ParseColorError, PipelineConfig, Rgb, DEFAULT_ALPHA_CUTOFF};
use utoipa::ToSchema;

use crate::error::RenderError;
use crate::models::AppConfig;

/// Final background of the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Background {
    /// Keep the alpha channel
    Transparent,
    /// Flatten onto an opaque color
    Color(Rgb),
}

impl Background {
    pub fn color(self) -> Option<Rgb> {
        match self {
            Background::Transparent => None,
            Background::Color(c) => Some(c),
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::Color(Rgb::WHITE)
    }
}

impl FromStr for Background {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("transparent") || s.eq_ignore_ascii_case("none") {
            return Ok(Background::Transparent);
        }
        s.parse().map(Background::Color)
    }
}

impl<'de> Deserialize<'de> for Background {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Body of `POST /render`
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RenderRequest {
    /// Module image URLs, left to right
    #[serde(default)]
    pub urls: Vec<String>,
    /// Rendering options
    #[serde(default)]
    pub options: RenderOptions,
}

/// Optional rendering parameters. Unset fields use the server defaults.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct RenderOptions {
    /// How background margins are detected
    pub trim: Option<TrimOption>,
    /// Pixels kept around each trimmed module
    pub padding: Option<u32>,
    /// Pixels removed from edges facing a neighbour
    #[serde(alias = "seamCrop")]
    pub seam_crop: u32,
    /// Common module height; smallest input height when unset
    #[serde(alias = "height", alias = "targetHeight")]
    pub target_height: Option<u32>,
    /// Color name, `#rrggbb`, or `"transparent"`
    #[serde(alias = "bg")]
    #[schema(value_type = Option<String>, example = "white")]
    pub background: Option<Background>,
    /// Pixels shared by neighbouring modules
    pub overlap: u32,
    /// Pixels of background between modules
    pub gap: u32,
    /// Shorthand for the tolerance of the default white trim
    #[serde(alias = "tol")]
    pub tolerance: Option<f32>,
    /// Draw a soft shadow under the modules
    #[serde(alias = "addShadow")]
    pub add_shadow: bool,
    /// Draw a base strip below the modules
    #[serde(alias = "addBase")]
    pub add_base: bool,
}

/// Trim mode, selected by the `mode` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TrimOption {
    /// Pixels close to a known color are background
    Fixed {
        #[schema(value_type = Option<String>, example = "#ffffff")]
        color: Option<Rgb>,
        tolerance: Option<f32>,
    },
    /// Background color is sampled from the image corners
    Corners { tolerance: Option<f32> },
    /// Nearly transparent pixels are background
    Alpha { cutoff: Option<u8> },
}

/// A request that passed validation, ready for fetching.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub urls: Vec<Url>,
    pub pipeline: PipelineConfig,
}

impl RenderRequest {
    /// Check the request against `config` and resolve defaults.
    ///
    /// Nothing here touches the network.
    pub fn validate(self, config: &AppConfig) -> Result<ValidatedRequest, RenderError> {
        if self.urls.is_empty() {
            return Err(RenderError::InvalidRequest(
                "'urls' must contain at least one URL".to_string(),
            ));
        }
        if self.urls.len() > config.limits.max_images {
            return Err(RenderError::InvalidRequest(format!(
                "too many URLs: {} (max {})",
                self.urls.len(),
                config.limits.max_images
            )));
        }

        let urls = self
            .urls
            .iter()
            .enumerate()
            .map(|(index, raw)| parse_image_url(index, raw))
            .collect::<Result<Vec<_>, _>>()?;

        let pipeline = self.options.resolve(config)?;
        Ok(ValidatedRequest { urls, pipeline })
    }
}

fn parse_image_url(index: usize, raw: &str) -> Result<Url, RenderError> {
    let invalid = |message: String| RenderError::InvalidUrl {
        index,
        url: raw.to_string(),
        message,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

impl RenderOptions {
    /// Merge with the server defaults into a [`PipelineConfig`].
    pub fn resolve(&self, config: &AppConfig) -> Result<PipelineConfig, RenderError> {
        if self.overlap > 0 && self.gap > 0 {
            return Err(RenderError::InvalidRequest(
                "'overlap' and 'gap' cannot both be set".to_string(),
            ));
        }
        if self.target_height == Some(0) {
            return Err(RenderError::InvalidRequest(
                "'target_height' must be positive".to_string(),
            ));
        }
        let max = config.limits.max_dimension;
        if let Some(height) = self.target_height {
            check_geometry("target_height", height, max)?;
        }
        check_geometry("overlap", self.overlap, max)?;
        check_geometry("gap", self.gap, max)?;

        let default_tolerance = match self.tolerance {
            Some(t) => check_tolerance(t)?,
            None => config.defaults.tolerance,
        };
        let trim = match &self.trim {
            None => BackgroundModel::FixedColorThreshold {
                color: Rgb::WHITE,
                tolerance: default_tolerance,
            },
            Some(TrimOption::Fixed { color, tolerance }) => BackgroundModel::FixedColorThreshold {
                color: color.unwrap_or(Rgb::WHITE),
                tolerance: tolerance.map(check_tolerance).transpose()?.unwrap_or(default_tolerance),
            },
            Some(TrimOption::Corners { tolerance }) => BackgroundModel::CornerSampledThreshold {
                tolerance: tolerance.map(check_tolerance).transpose()?.unwrap_or(default_tolerance),
            },
            Some(TrimOption::Alpha { cutoff }) => BackgroundModel::AlphaThreshold {
                cutoff: cutoff.unwrap_or(DEFAULT_ALPHA_CUTOFF),
            },
        };

        let overlap = if self.gap > 0 {
            -to_offset("gap", self.gap)?
        } else {
            to_offset("overlap", self.overlap)?
        };

        let background = self.background.unwrap_or(config.defaults.background);

        Ok(PipelineConfig::new()
            .trim(trim)
            .padding(self.padding.unwrap_or(config.defaults.padding))
            .seam_crop(self.seam_crop)
            .target_height(self.target_height)
            .overlap(overlap)
            .background(background.color())
            .shadow(self.add_shadow.then_some(config.shadow))
            .base(self.add_base.then_some(config.base))
            .max_dimension(config.limits.max_dimension))
    }
}

fn check_tolerance(tolerance: f32) -> Result<f32, RenderError> {
    if tolerance.is_finite() && tolerance >= 0.0 {
        Ok(tolerance)
    } else {
        Err(RenderError::InvalidRequest(format!(
            "'tolerance' must be a non-negative number, got {tolerance}"
        )))
    }
}

/// Pixel geometry may not exceed the decoded-image size limit.
fn check_geometry(name: &str, value: u32, max_dimension: u32) -> Result<(), RenderError> {
    if max_dimension > 0 && value > max_dimension {
        return Err(RenderError::InvalidRequest(format!(
            "'{name}' must be at most {max_dimension}, got {value}"
        )));
    }
    Ok(())
}

fn to_offset(name: &str, value: u32) -> Result<i32, RenderError> {
    i32::try_from(value)
        .map_err(|_| RenderError::InvalidRequest(format!("'{name}' is too large: {value}")))
}
