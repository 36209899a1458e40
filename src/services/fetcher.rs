//! Image download with bounded retries.
//!
//! [`ImageFetcher`] is the seam between the render service and the network;
//! [`HttpFetcher`] is the reqwest-backed implementation used in production.

use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// What went wrong while fetching one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Connection, DNS, TLS or timeout failure
    Network,
    /// Upstream answered with a non-success status
    HttpStatus,
    /// Upstream answered with a non-image content type
    NotAnImage,
    /// Body exceeded the download limit
    TooLarge,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchErrorKind::Network => "network error",
            FetchErrorKind::HttpStatus => "HTTP status",
            FetchErrorKind::NotAnImage => "not an image",
            FetchErrorKind::TooLarge => "too large",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    /// Upstream HTTP status, when one was received
    pub status: Option<u16>,
    pub message: String,
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Network,
            status: None,
            message: message.into(),
        }
    }

    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::HttpStatus,
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn not_an_image(status: u16, content_type: &str) -> Self {
        Self {
            kind: FetchErrorKind::NotAnImage,
            status: Some(status),
            message: format!("unexpected content type '{content_type}'"),
        }
    }

    pub fn too_large(limit: u64) -> Self {
        Self {
            kind: FetchErrorKind::TooLarge,
            status: None,
            message: format!("body exceeds {limit} bytes"),
        }
    }

    /// Oversized bodies will be oversized again; everything else may be transient.
    pub fn is_retryable(&self) -> bool {
        self.kind != FetchErrorKind::TooLarge
    }
}

/// Retrieves raw encoded image bytes for a URL.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<Bytes, FetchError>;
}

/// reqwest-backed [`ImageFetcher`].
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: u64,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, max_bytes: u64) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client, max_bytes })
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<Bytes, FetchError> {
        let mut response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| network_error(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(
                status.as_u16(),
                format!("upstream returned {status}"),
            ));
        }

        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_image_content_type(content_type) {
                return Err(FetchError::not_an_image(status.as_u16(), content_type));
            }
        }

        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes)
        {
            return Err(FetchError::too_large(self.max_bytes));
        }

        // Content-Length may be absent or wrong, so the limit is enforced
        // while streaming as well.
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| network_error(e, timeout))?
        {
            if (body.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(FetchError::too_large(self.max_bytes));
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(url = %url, size_bytes = body.len(), "Fetched image");
        Ok(Bytes::from(body))
    }
}

fn network_error(e: reqwest::Error, timeout: Duration) -> FetchError {
    if e.is_timeout() {
        FetchError::network(format!("timed out after {}s", timeout.as_secs_f32()))
    } else {
        FetchError::network(e.to_string())
    }
}

/// Accepts `image/*` and the generic binary types some CDNs send.
pub fn is_image_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.is_empty()
        || mime.starts_with("image/")
        || mime == "application/octet-stream"
        || mime == "binary/octet-stream"
}

/// Extra attempts after the first one, with linearly growing delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based): `backoff * attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

/// Fetch `url`, retrying retryable failures up to `policy.retries` times.
///
/// The last error is returned once the budget is exhausted.
pub async fn fetch_with_retry(
    fetcher: &dyn ImageFetcher,
    url: &Url,
    timeout: Duration,
    policy: RetryPolicy,
) -> Result<Bytes, FetchError> {
    let mut attempt = 0u32;
    loop {
        match fetcher.fetch(url, timeout).await {
            Ok(bytes) => return Ok(bytes),
            Err(e) if e.is_retryable() && attempt < policy.retries => {
                attempt += 1;
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    url = %url,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Fetch failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
