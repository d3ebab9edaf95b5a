// src/presentation/http/controllers/articles.rs
use crate::application::{
    commands::articles::{CreateArticleCommand, PublishArticleCommand, UpdateArticleCommand},
    dto::{ArticleDto, PublishReceiptDto},
    queries::articles::GetArticleByIdQuery,
};
use crate::presentation::http::error::{HttpResult, IntoHttpResult};
use crate::presentation::http::extractors::Authorized;
use crate::presentation::http::state::HttpState;
use axum::{
    Extension, Json,
    extract::Path,
    http::StatusCode,
};
use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateArticleRequest {
    pub title: String,
    pub body: String,
    /// Unknown themes fall back to `default` at render time.
    #[serde(default)]
    pub theme: Option<String>,
    /// Staged image used as the draft cover.
    #[serde(default)]
    pub cover_image: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub theme: Option<String>,
    /// Omit to keep the cover, `null` to clear it.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub cover_image: Option<Option<String>>,
}

/// Distinguishes an explicit `null` from a missing field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[utoipa::path(
    get,
    path = "/api/v1/articles",
    responses(
        (status = 200, description = "Articles, most recently updated first.", body = [ArticleDto]),
        (status = 401, description = "Unauthorized.", body = crate::presentation::http::error::ErrorResponse)
    ),
    tag = "Articles"
)]
pub async fn list_articles(
    Extension(state): Extension<HttpState>,
    _auth: Authorized,
) -> HttpResult<Json<Vec<ArticleDto>>> {
    state
        .services
        .article_queries
        .list_articles()
        .await
        .into_http()
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/api/v1/articles/{id}",
    params(("id" = String, Path, description = "Article identifier")),
    responses(
        (status = 200, description = "The article.", body = ArticleDto),
        (status = 404, description = "Article not found.", body = crate::presentation::http::error::ErrorResponse)
    ),
    tag = "Articles"
)]
pub async fn get_article(
    Extension(state): Extension<HttpState>,
    _auth: Authorized,
    Path(id): Path<String>,
) -> HttpResult<Json<ArticleDto>> {
    state
        .services
        .article_queries
        .get_article_by_id(GetArticleByIdQuery { id })
        .await
        .into_http()
        .map(Json)
}

#[utoipa::path(
    post,
    path = "/api/v1/articles",
    request_body = CreateArticleRequest,
    responses(
        (status = 201, description = "Article created.", body = ArticleDto),
        (status = 400, description = "Invalid article.", body = crate::presentation::http::error::ErrorResponse),
        (status = 401, description = "Unauthorized.", body = crate::presentation::http::error::ErrorResponse)
    ),
    tag = "Articles"
)]
pub async fn create_article(
    Extension(state): Extension<HttpState>,
    _auth: Authorized,
    Json(payload): Json<CreateArticleRequest>,
) -> HttpResult<(StatusCode, Json<ArticleDto>)> {
    let command = CreateArticleCommand {
        title: payload.title,
        body: payload.body,
        theme: payload.theme,
        cover_image: payload.cover_image,
    };

    state
        .services
        .article_commands
        .create_article(command)
        .await
        .into_http()
        .map(|article| (StatusCode::CREATED, Json(article)))
}

#[utoipa::path(
    put,
    path = "/api/v1/articles/{id}",
    params(("id" = String, Path, description = "Article identifier")),
    request_body = UpdateArticleRequest,
    responses(
        (status = 200, description = "Article updated.", body = ArticleDto),
        (status = 400, description = "Invalid article.", body = crate::presentation::http::error::ErrorResponse),
        (status = 404, description = "Article not found.", body = crate::presentation::http::error::ErrorResponse)
    ),
    tag = "Articles"
)]
pub async fn update_article(
    Extension(state): Extension<HttpState>,
    _auth: Authorized,
    Path(id): Path<String>,
    Json(payload): Json<UpdateArticleRequest>,
) -> HttpResult<Json<ArticleDto>> {
    let command = UpdateArticleCommand {
        id,
        title: payload.title,
        body: payload.body,
        theme: payload.theme,
        cover_image: payload.cover_image,
    };

    state
        .services
        .article_commands
        .update_article(command)
        .await
        .into_http()
        .map(Json)
}

#[utoipa::path(
    post,
    path = "/api/v1/articles/{id}/publish",
    params(("id" = String, Path, description = "Article identifier")),
    responses(
        (status = 200, description = "Draft created on the platform.", body = PublishReceiptDto),
        (status = 404, description = "Article not found.", body = crate::presentation::http::error::ErrorResponse),
        (status = 422, description = "An image cannot be published.", body = crate::presentation::http::error::ErrorResponse),
        (status = 502, description = "The platform refused an upload or the draft.", body = crate::presentation::http::error::ErrorResponse),
        (status = 503, description = "No platform credential could be obtained.", body = crate::presentation::http::error::ErrorResponse),
        (status = 504, description = "The platform did not answer in time.", body = crate::presentation::http::error::ErrorResponse)
    ),
    tag = "Articles"
)]
pub async fn publish_article(
    Extension(state): Extension<HttpState>,
    _auth: Authorized,
    Path(id): Path<String>,
) -> HttpResult<Json<PublishReceiptDto>> {
    state
        .services
        .article_commands
        .publish_article(PublishArticleCommand { id })
        .await
        .into_http()
        .map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_distinguishes_null_from_missing() {
        let keep: UpdateArticleRequest = serde_json::from_str(r#"{"title":"t"}"#).unwrap();
        assert_eq!(keep.cover_image, None);

        let clear: UpdateArticleRequest = serde_json::from_str(r#"{"cover_image":null}"#).unwrap();
        assert_eq!(clear.cover_image, Some(None));

        let set: UpdateArticleRequest =
            serde_json::from_str(r#"{"cover_image":"abc.png"}"#).unwrap();
        assert_eq!(set.cover_image, Some(Some("abc.png".into())));
    }
}
