use crate::domain::article::{Article, DraftId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::serde_time;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArticleDto {
    pub id: String,
    pub title: String,
    pub body: String,
    pub theme: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    /// Site-relative path of the rendered preview page.
    pub preview_path: String,
    #[serde(default)]
    pub draft_id: Option<String>,
    #[serde(default, with = "serde_time::option")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(with = "serde_time")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "serde_time")]
    pub updated_at: DateTime<Utc>,
}

impl From<Article> for ArticleDto {
    fn from(article: Article) -> Self {
        Self {
            preview_path: format!("/preview/{}", article.id),
            id: article.id.into(),
            title: article.title.into(),
            body: article.body.into(),
            theme: article.theme.to_string(),
            cover_image: article.cover_image.map(|image| image.to_string()),
            draft_id: article.draft_id.map(Into::into),
            published_at: article.published_at,
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

/// Result of a successful publish.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublishReceiptDto {
    pub article_id: String,
    pub draft_id: String,
    #[serde(with = "serde_time")]
    pub published_at: DateTime<Utc>,
}

impl PublishReceiptDto {
    pub fn new(article: &Article, draft_id: &DraftId, published_at: DateTime<Utc>) -> Self {
        Self {
            article_id: article.id.to_string(),
            draft_id: draft_id.to_string(),
            published_at,
        }
    }
}
