// src/presentation/http/routes.rs
use crate::application::commands::images::MAX_STAGED_BYTES;
use crate::presentation::http::controllers::{articles, images, preview, system};
use crate::presentation::http::{openapi, state::HttpState};
use axum::{
    Extension, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// Base64 inflates by 4/3; the rest is JSON framing.
const STAGE_BODY_LIMIT: usize = MAX_STAGED_BYTES * 4 / 3 + 64 * 1024;

pub fn build_router(state: HttpState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route(openapi::OPENAPI_PATH, get(openapi::serve_openapi))
        .route("/api/v1/themes", get(system::list_themes))
        .route(
            "/api/v1/articles",
            get(articles::list_articles).post(articles::create_article),
        )
        .route(
            "/api/v1/articles/{id}",
            get(articles::get_article).put(articles::update_article),
        )
        .route(
            "/api/v1/articles/{id}/publish",
            post(articles::publish_article),
        )
        .route(
            "/api/v1/images",
            post(images::stage_image).layer(DefaultBodyLimit::max(STAGE_BODY_LIMIT)),
        )
        .route("/images/{image}", get(images::serve_image))
        .route("/preview/{id}", get(preview::preview_article))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .layer(Extension(state))
}

/// An empty list or `*` allows any origin.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}
