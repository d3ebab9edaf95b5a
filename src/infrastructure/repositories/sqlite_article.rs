use super::error::map_sqlx;
use crate::domain::{
    article::{
        Article, ArticleBody, ArticleId, ArticleReadRepository, ArticleTitle, ArticleUpdate,
        ArticleWriteRepository, DraftId, NewArticle, PublishedDraft, ThemeId,
    },
    errors::{DomainError, DomainResult},
    media::ImageRef,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

const COLUMNS: &str =
    "id, title, body, theme, cover_image, draft_id, published_at, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteArticleWriteRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteArticleWriteRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[derive(Clone)]
pub struct SqliteArticleReadRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteArticleReadRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ArticleRow {
    id: String,
    title: String,
    body: String,
    theme: String,
    cover_image: Option<String>,
    draft_id: Option<String>,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ArticleRow> for Article {
    type Error = DomainError;

    fn try_from(row: ArticleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ArticleId::new(row.id)?,
            title: ArticleTitle::new(row.title)?,
            body: ArticleBody::new(row.body),
            theme: ThemeId::new(row.theme),
            cover_image: row.cover_image.map(ImageRef::parse).transpose()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            published_at: row.published_at,
            draft_id: row.draft_id.map(DraftId::new).transpose()?,
        })
    }
}

fn not_found(id: &ArticleId) -> DomainError {
    DomainError::NotFound(format!("article {id}"))
}

#[async_trait]
impl ArticleWriteRepository for SqliteArticleWriteRepository {
    async fn insert(&self, article: NewArticle) -> DomainResult<Article> {
        let NewArticle {
            id,
            title,
            body,
            theme,
            cover_image,
            created_at,
            updated_at,
        } = article;

        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "INSERT INTO articles (id, title, body, theme, cover_image, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(id.as_str())
        .bind(title.as_str())
        .bind(body.as_str())
        .bind(theme.as_str())
        .bind(cover_image.as_ref().map(ImageRef::as_str))
        .bind(created_at)
        .bind(updated_at)
        .fetch_one(&*self.pool)
        .await
        .map_err(map_sqlx)?;

        Article::try_from(row)
    }

    async fn update(&self, update: ArticleUpdate) -> DomainResult<Article> {
        let ArticleUpdate {
            id,
            title,
            body,
            theme,
            cover_image,
            updated_at,
        } = update;

        // cover_image: NULL keeps the current value, the flag clears it.
        let clear_cover = matches!(cover_image, Some(None));
        let new_cover = cover_image.flatten();

        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "UPDATE articles SET title = COALESCE(?, title), body = COALESCE(?, body), theme = COALESCE(?, theme), cover_image = CASE WHEN ? THEN NULL ELSE COALESCE(?, cover_image) END, updated_at = ? WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(title.as_ref().map(ArticleTitle::as_str))
        .bind(body.as_ref().map(ArticleBody::as_str))
        .bind(theme.as_ref().map(ThemeId::as_str))
        .bind(clear_cover)
        .bind(new_cover.as_ref().map(ImageRef::as_str))
        .bind(updated_at)
        .bind(id.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(map_sqlx)?;

        row.ok_or_else(|| not_found(&id)).and_then(Article::try_from)
    }

    async fn record_draft(&self, published: PublishedDraft) -> DomainResult<Article> {
        let PublishedDraft {
            id,
            draft_id,
            published_at,
        } = published;

        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "UPDATE articles SET draft_id = ?, published_at = ? WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(draft_id.as_str())
        .bind(published_at)
        .bind(id.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(map_sqlx)?;

        row.ok_or_else(|| not_found(&id)).and_then(Article::try_from)
    }
}

#[async_trait]
impl ArticleReadRepository for SqliteArticleReadRepository {
    async fn find_by_id(&self, id: &ArticleId) -> DomainResult<Option<Article>> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {COLUMNS} FROM articles WHERE id = ?"
        ))
        .bind(id.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(map_sqlx)?;

        row.map(Article::try_from).transpose()
    }

    async fn list(&self) -> DomainResult<Vec<Article>> {
        let rows = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {COLUMNS} FROM articles ORDER BY updated_at DESC, id DESC"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.into_iter().map(Article::try_from).collect()
    }
}
