use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use strip_compose::ComposeError;
use thiserror::Error;
use utoipa::ToSchema;

use crate::services::fetcher::FetchError;

/// Pipeline stage an error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Request,
    Fetch,
    Decode,
    Pipeline,
}

impl Stage {
    pub fn status_code(self) -> StatusCode {
        match self {
            Stage::Request => StatusCode::BAD_REQUEST,
            Stage::Fetch => StatusCode::BAD_GATEWAY,
            Stage::Decode => StatusCode::UNPROCESSABLE_ENTITY,
            Stage::Pipeline => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid URL at index {index} ({url}): {message}")]
    InvalidUrl {
        index: usize,
        url: String,
        message: String,
    },

    #[error("Failed to fetch image {index} ({url}): {source}")]
    Fetch {
        index: usize,
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("Failed to decode image {index} ({url}): {message}")]
    Decode {
        index: usize,
        url: String,
        message: String,
    },

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("PNG encode error: {0}")]
    PngEncode(String),
}

impl From<ComposeError> for RenderError {
    fn from(e: ComposeError) -> Self {
        RenderError::Pipeline(e.to_string())
    }
}

impl RenderError {
    pub fn stage(&self) -> Stage {
        match self {
            RenderError::InvalidRequest(_) | RenderError::InvalidUrl { .. } => Stage::Request,
            RenderError::Fetch { .. } => Stage::Fetch,
            RenderError::Decode { .. } => Stage::Decode,
            RenderError::Pipeline(_) | RenderError::PngEncode(_) => Stage::Pipeline,
        }
    }

    /// Zero-based index of the offending input, if any.
    pub fn index(&self) -> Option<usize> {
        match self {
            RenderError::InvalidUrl { index, .. }
            | RenderError::Fetch { index, .. }
            | RenderError::Decode { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            RenderError::InvalidUrl { url, .. }
            | RenderError::Fetch { url, .. }
            | RenderError::Decode { url, .. } => Some(url),
            _ => None,
        }
    }

    /// HTTP status returned by the image host, for fetch failures.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            RenderError::Fetch { source, .. } => source.status,
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

/// JSON body of every failed request
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP status code
    pub status: u16,
    /// Human-readable message
    pub error: String,
    /// Stage that failed
    pub stage: Stage,
    /// Zero-based index of the offending input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// URL of the offending input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Status code returned by the image host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

impl ApiError {
    pub fn stage(&self) -> Stage {
        match self {
            ApiError::InvalidBody(_) => Stage::Request,
            ApiError::Render(e) => e.stage(),
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let stage = self.stage();
        let (index, url, upstream_status) = match self {
            ApiError::Render(e) => (e.index(), e.url().map(str::to_string), e.upstream_status()),
            _ => (None, None, None),
        };
        ErrorResponse {
            status: stage.status_code().as_u16(),
            error: self.to_string(),
            stage,
            index,
            url,
            upstream_status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = self.to_error_response();
        let status = self.stage().status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, stage = ?body.stage, "Render request failed");
        } else {
            tracing::warn!(error = %self, stage = ?body.stage, index = ?body.index, "Render request rejected");
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fetcher::FetchErrorKind;

    fn not_found() -> FetchError {
        FetchError {
            kind: FetchErrorKind::HttpStatus,
            status: Some(404),
            message: "upstream returned 404 Not Found".to_string(),
        }
    }

    #[test]
    fn test_render_error_invalid_request() {
        let error = RenderError::InvalidRequest("'urls' must not be empty".to_string());
        assert_eq!(error.to_string(), "Invalid request: 'urls' must not be empty");
        assert_eq!(error.stage(), Stage::Request);
        assert_eq!(error.index(), None);
    }

    #[test]
    fn test_render_error_fetch_context() {
        let error = RenderError::Fetch {
            index: 2,
            url: "http://img.test/c.png".to_string(),
            source: not_found(),
        };
        assert_eq!(error.stage(), Stage::Fetch);
        assert_eq!(error.index(), Some(2));
        assert_eq!(error.url(), Some("http://img.test/c.png"));
        assert_eq!(error.upstream_status(), Some(404));
    }

    #[test]
    fn test_render_error_from_compose_error() {
        let error: RenderError = ComposeError::EmptyInput.into();
        assert_eq!(error.stage(), Stage::Pipeline);
        assert_eq!(error.to_string(), "Pipeline error: no images to compose");
    }

    #[test]
    fn test_api_error_from_render_error() {
        let api_error: ApiError = RenderError::Pipeline("boom".to_string()).into();
        match api_error {
            ApiError::Render(_) => {}
            _ => panic!("Expected Render variant"),
        }
    }

    #[test]
    fn test_api_error_into_response_status_codes() {
        let response = ApiError::InvalidBody("expected value".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::Render(RenderError::Fetch {
            index: 0,
            url: "http://img.test/a.png".to_string(),
            source: not_found(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = ApiError::Render(RenderError::Decode {
            index: 0,
            url: "http://img.test/a.png".to_string(),
            message: "bad magic".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response =
            ApiError::Render(RenderError::Pipeline("no images".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_response_fields() {
        let body = ApiError::Render(RenderError::Fetch {
            index: 1,
            url: "http://img.test/b.png".to_string(),
            source: not_found(),
        })
        .to_error_response();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], 502);
        assert_eq!(json["stage"], "fetch");
        assert_eq!(json["index"], 1);
        assert_eq!(json["url"], "http://img.test/b.png");
        assert_eq!(json["upstream_status"], 404);
    }

    #[test]
    fn test_error_response_omits_missing_context() {
        let body = ApiError::InvalidBody("EOF".to_string()).to_error_response();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stage"], "request");
        assert!(json.get("index").is_none());
        assert!(json.get("url").is_none());
        assert!(json.get("upstream_status").is_none());
    }
}
