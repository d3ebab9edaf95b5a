// src/presentation/http/controllers/images.rs
use crate::application::{commands::images::StageImageCommand, dto::StagedImageDto};
use crate::presentation::http::error::{HttpResult, IntoHttpResult};
use crate::presentation::http::extractors::Authorized;
use crate::presentation::http::state::HttpState;
use axum::{
    Extension, Json,
    extract::Path,
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct StageImageRequest {
    /// Base64 image content; a `data:` URL is accepted as well.
    pub data: String,
    /// Used only when the format cannot be recognised from the content.
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/images",
    request_body = StageImageRequest,
    responses(
        (status = 201, description = "Image staged locally.", body = StagedImageDto),
        (status = 400, description = "Not a recognised image.", body = crate::presentation::http::error::ErrorResponse),
        (status = 401, description = "Unauthorized.", body = crate::presentation::http::error::ErrorResponse)
    ),
    tag = "Images"
)]
pub async fn stage_image(
    Extension(state): Extension<HttpState>,
    _auth: Authorized,
    Json(payload): Json<StageImageRequest>,
) -> HttpResult<(StatusCode, Json<StagedImageDto>)> {
    let command = StageImageCommand {
        data: payload.data,
        mime_type: payload.mime_type,
    };

    state
        .services
        .image_commands
        .stage_image(command)
        .await
        .into_http()
        .map(|image| (StatusCode::CREATED, Json(image)))
}

#[utoipa::path(
    get,
    path = "/images/{image}",
    params(("image" = String, Path, description = "Staged image name")),
    responses(
        (status = 200, description = "Image content with its image content type."),
        (status = 404, description = "No such staged image.", body = crate::presentation::http::error::ErrorResponse)
    ),
    security([]),
    tag = "Images"
)]
pub async fn serve_image(
    Extension(state): Extension<HttpState>,
    Path(image): Path<String>,
) -> HttpResult<impl IntoResponse> {
    let staged = state
        .services
        .image_queries
        .load_image(&image)
        .await
        .into_http()?;

    Ok((
        [
            (header::CONTENT_TYPE, staged.format.mime_type()),
            // Staged names are content-independent uuids and never rewritten.
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
        ],
        staged.bytes,
    ))
}
