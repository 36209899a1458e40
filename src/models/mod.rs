pub mod config;
pub mod request;

pub use config::{AppConfig, DefaultsConfig, FetchConfig, LimitsConfig};
pub use request::{Background, RenderOptions, RenderRequest, TrimOption, ValidatedRequest};
