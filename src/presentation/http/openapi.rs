// src/presentation/http/openapi.rs
use axum::{
    body::Body,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use once_cell::sync::Lazy;
use utoipa::openapi::{
    Components,
    security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa::{Modify, OpenApi};

pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::controllers::system::health,
        crate::presentation::http::controllers::system::list_themes,
        crate::presentation::http::controllers::articles::list_articles,
        crate::presentation::http::controllers::articles::get_article,
        crate::presentation::http::controllers::articles::create_article,
        crate::presentation::http::controllers::articles::update_article,
        crate::presentation::http::controllers::articles::publish_article,
        crate::presentation::http::controllers::images::stage_image,
        crate::presentation::http::controllers::images::serve_image,
        crate::presentation::http::controllers::preview::preview_article
    ),
    components(
        schemas(
            crate::presentation::http::error::ErrorResponse,
            crate::presentation::http::controllers::system::HealthResponse,
            crate::presentation::http::controllers::articles::CreateArticleRequest,
            crate::presentation::http::controllers::articles::UpdateArticleRequest,
            crate::presentation::http::controllers::images::StageImageRequest,
            crate::application::dto::ArticleDto,
            crate::application::dto::PublishReceiptDto,
            crate::application::dto::StagedImageDto,
            crate::application::dto::ThemeDto
        )
    ),
    tags(
        (name = "Articles", description = "Article editing, preview and publishing"),
        (name = "Images", description = "Local image staging"),
        (name = "System", description = "System level endpoints")
    ),
    modifiers(&ApiDocCustomizer),
    security(("bearerAuth" = [])),
    info(
        title = "draft_relay API",
        description = "Markdown to WeChat draft publishing service",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;

struct ApiDocCustomizer;

impl Modify for ApiDocCustomizer {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Components::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// Serialized once; the document cannot change while the process runs.
static OPENAPI_JSON: Lazy<Bytes> = Lazy::new(|| {
    serde_json::to_vec(&ApiDoc::openapi())
        .map(Bytes::from)
        .unwrap_or_else(|_| Bytes::from_static(b"{}"))
});

static OPENAPI_ETAG: Lazy<String> =
    Lazy::new(|| format!("\"{}\"", &blake3::hash(&OPENAPI_JSON).to_hex()[..16]));

fn etag_matches(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .any(|tag| tag == "*" || tag.trim_start_matches("W/") == OPENAPI_ETAG.as_str())
}

/// GET handler for the OpenAPI document, honouring `If-None-Match`.
pub async fn serve_openapi(headers: HeaderMap) -> Response {
    let etag = OPENAPI_ETAG.as_str();
    if etag_matches(&headers) {
        return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response();
    }
    (
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::ETAG, etag),
        ],
        Body::from(OPENAPI_JSON.clone()),
    )
        .into_response()
}
