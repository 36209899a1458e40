use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use strip_compose::{BaseOptions, ShadowOptions, DEFAULT_MAX_DIMENSION, DEFAULT_PADDING, DEFAULT_TOLERANCE};

use crate::models::Background;
use crate::services::fetcher::RetryPolicy;

/// Application configuration loaded from a YAML file
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Request and image size limits
    pub limits: LimitsConfig,
    /// Image download behaviour
    pub fetch: FetchConfig,
    /// Defaults for options a request leaves unset
    pub defaults: DefaultsConfig,
    /// Shadow parameters used when a request sets `add_shadow`
    pub shadow: ShadowOptions,
    /// Base parameters used when a request sets `add_base`
    pub base: BaseOptions,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum number of URLs per request
    pub max_images: usize,
    /// Longer side a decoded image is downscaled to
    pub max_dimension: u32,
    /// Maximum size of one downloaded image
    pub max_download_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_images: 24,
            max_dimension: DEFAULT_MAX_DIMENSION,
            max_download_bytes: 20 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-attempt timeout
    pub timeout_secs: u64,
    /// Extra attempts after a failed one
    pub retries: u32,
    /// Base retry delay, multiplied by the attempt number
    pub backoff_ms: u64,
    /// Downloads in flight per request
    pub concurrency: usize,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            retries: 2,
            backoff_ms: 500,
            concurrency: 4,
            user_agent: concat!("modstrip/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries,
            backoff: Duration::from_millis(self.backoff_ms),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Color distance for the default white trim
    pub tolerance: f32,
    pub padding: u32,
    /// Color name, `#rrggbb` or `transparent`
    pub background: Background,
    /// Re-compress output with oxipng
    pub optimize_png: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            padding: DEFAULT_PADDING,
            background: Background::default(),
            optimize_png: true,
        }
    }
}

impl AppConfig {
    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not to an empty map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Load configuration from `path`, falling back to defaults when the
    /// file is absent, unreadable or invalid.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::info!("No config file set, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml_str(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        max_images = config.limits.max_images,
                        retries = config.fetch.retries,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }
}
