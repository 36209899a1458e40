use axum::body::Bytes;
use futures_util::{stream, StreamExt, TryStreamExt};
use reqwest::Url;
use std::sync::Arc;
use strip_compose::{PipelineConfig, RasterImage};

use crate::error::RenderError;
use crate::models::{AppConfig, RenderRequest, ValidatedRequest};
use crate::rendering::encode_png;
use crate::services::fetcher::{fetch_with_retry, ImageFetcher};

/// Encoded strip plus its dimensions
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Fetches module images and runs the compose pipeline over them
pub struct RenderService {
    config: Arc<AppConfig>,
    fetcher: Arc<dyn ImageFetcher>,
}

impl RenderService {
    pub fn new(config: Arc<AppConfig>, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self { config, fetcher }
    }

    /// Validate, fetch, compose and encode.
    pub async fn render(&self, request: RenderRequest) -> Result<RenderOutput, RenderError> {
        let request = request.validate(&self.config)?;
        self.render_validated(request).await
    }

    pub async fn render_validated(
        &self,
        request: ValidatedRequest,
    ) -> Result<RenderOutput, RenderError> {
        let ValidatedRequest { urls, pipeline } = request;
        tracing::info!(modules = urls.len(), "Rendering strip");

        let downloads = self.fetch_all(&urls).await?;

        // Decoding, composing and encoding are CPU-bound
        let optimize = self.config.defaults.optimize_png;
        let output = tokio::task::spawn_blocking(move || {
            compose_blocking(&urls, downloads, &pipeline, optimize)
        })
        .await
        .map_err(|e| RenderError::Pipeline(format!("Render task failed: {e}")))??;

        tracing::info!(
            width = output.width,
            height = output.height,
            size_bytes = output.png.len(),
            "Strip rendered"
        );
        Ok(output)
    }

    /// Download every URL with bounded concurrency, preserving input order.
    /// The first failure (by input position) aborts the whole set.
    async fn fetch_all(&self, urls: &[Url]) -> Result<Vec<Bytes>, RenderError> {
        let timeout = self.config.fetch.timeout();
        let policy = self.config.fetch.retry_policy();
        let concurrency = self.config.fetch.concurrency.max(1);

        let fetches: Vec<_> = urls
            .iter()
            .enumerate()
            .map(|(index, url)| async move {
                tracing::info!(index, url = %url, "Fetching module image");
                fetch_with_retry(self.fetcher.as_ref(), url, timeout, policy)
                    .await
                    .map_err(|source| {
                        tracing::warn!(index, url = %url, error = %source, "Giving up on module image");
                        RenderError::Fetch {
                            index,
                            url: url.to_string(),
                            source,
                        }
                    })
            })
            .collect();
        stream::iter(fetches)
            .buffered(concurrency)
            .try_collect()
            .await
    }
}

fn compose_blocking(
    urls: &[Url],
    downloads: Vec<Bytes>,
    pipeline: &PipelineConfig,
    optimize: bool,
) -> Result<RenderOutput, RenderError> {
    let images = urls
        .iter()
        .zip(&downloads)
        .enumerate()
        .map(|(index, (url, bytes))| {
            let image = RasterImage::decode(bytes).map_err(|e| RenderError::Decode {
                index,
                url: url.to_string(),
                message: e.to_string(),
            })?;
            tracing::debug!(
                index,
                width = image.width(),
                height = image.height(),
                alpha = image.has_alpha(),
                "Decoded module image"
            );
            Ok(image)
        })
        .collect::<Result<Vec<_>, RenderError>>()?;
    drop(downloads);

    let strip = strip_compose::render(images, pipeline)?;
    let png = encode_png(&strip, optimize)?;
    Ok(RenderOutput {
        png,
        width: strip.width(),
        height: strip.height(),
    })
}
