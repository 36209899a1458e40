pub mod fetcher;
pub mod render_service;

pub use fetcher::{
    fetch_with_retry, FetchError, FetchErrorKind, HttpFetcher, ImageFetcher, RetryPolicy,
};
pub use render_service::{RenderOutput, RenderService};
