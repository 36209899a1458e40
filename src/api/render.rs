use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::error::{ApiError, ErrorResponse};
use crate::models::RenderRequest;
use crate::services::RenderService;

pub const X_IMAGE_WIDTH: HeaderName = HeaderName::from_static("x-image-width");
pub const X_IMAGE_HEIGHT: HeaderName = HeaderName::from_static("x-image-height");

/// Render a module strip
///
/// Downloads every URL, trims and joins the images left to right and
/// returns the result as a PNG. Any failing input aborts the request.
#[utoipa::path(
    post,
    path = "/render",
    request_body = RenderRequest,
    responses(
        (status = 200, description = "Composite PNG image", content_type = "image/png",
            headers(
                ("X-Image-Width" = u32, description = "Width of the strip in pixels"),
                ("X-Image-Height" = u32, description = "Height of the strip in pixels"),
            )),
        (status = 400, description = "Malformed or invalid request", body = ErrorResponse),
        (status = 422, description = "A downloaded file is not a decodable image", body = ErrorResponse),
        (status = 500, description = "Internal rendering fault", body = ErrorResponse),
        (status = 502, description = "An image could not be downloaded", body = ErrorResponse),
    ),
    tag = "Render"
)]
pub async fn handle_render(
    State(renderer): State<Arc<RenderService>>,
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;

    tracing::info!(
        url_count = request.urls.len(),
        seam_crop = request.options.seam_crop,
        add_shadow = request.options.add_shadow,
        add_base = request.options.add_base,
        "Render request received"
    );

    let output = renderer.render(request).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CONTENT_LENGTH, output.png.len().to_string()),
            (X_IMAGE_WIDTH, output.width.to_string()),
            (X_IMAGE_HEIGHT, output.height.to_string()),
        ],
        Bytes::from(output.png),
    )
        .into_response())
}
