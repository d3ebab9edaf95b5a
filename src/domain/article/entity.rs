// src/domain/article/entity.rs
use crate::domain::article::value_objects::{ArticleBody, ArticleId, ArticleTitle, DraftId, ThemeId};
use crate::domain::media::ImageRef;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct Article {
    pub id: ArticleId,
    pub title: ArticleTitle,
    pub body: ArticleBody,
    pub theme: ThemeId,
    pub cover_image: Option<ImageRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub draft_id: Option<DraftId>,
}

impl Article {
    pub fn set_content(&mut self, title: ArticleTitle, body: ArticleBody, now: DateTime<Utc>) {
        self.title = title;
        self.body = body;
        self.updated_at = now;
    }

    pub fn set_theme(&mut self, theme: ThemeId, now: DateTime<Utc>) {
        self.theme = theme;
        self.updated_at = now;
    }

    pub fn set_cover(&mut self, cover: Option<ImageRef>, now: DateTime<Utc>) {
        self.cover_image = cover;
        self.updated_at = now;
    }

    /// Records the platform draft created for this article. Content timestamps
    /// are left untouched: publishing is not an edit.
    pub fn record_draft(&mut self, draft_id: DraftId, now: DateTime<Utc>) {
        self.draft_id = Some(draft_id);
        self.published_at = Some(now);
    }

    pub fn is_published(&self) -> bool {
        self.draft_id.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub id: ArticleId,
    pub title: ArticleTitle,
    pub body: ArticleBody,
    pub theme: ThemeId,
    pub cover_image: Option<ImageRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ArticleUpdate {
    pub id: ArticleId,
    pub title: Option<ArticleTitle>,
    pub body: Option<ArticleBody>,
    pub theme: Option<ThemeId>,
    pub cover_image: Option<Option<ImageRef>>,
    pub updated_at: DateTime<Utc>,
}

impl ArticleUpdate {
    pub fn new(id: ArticleId, updated_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: None,
            body: None,
            theme: None,
            cover_image: None,
            updated_at,
        }
    }

    pub fn with_title(mut self, title: ArticleTitle) -> Self {
        self.title = Some(title);
        self
    }

    pub fn with_body(mut self, body: ArticleBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_theme(mut self, theme: ThemeId) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn with_cover(mut self, cover: Option<ImageRef>) -> Self {
        self.cover_image = Some(cover);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.body.is_none()
            && self.theme.is_none()
            && self.cover_image.is_none()
    }
}

/// Outcome of a successful publish, persisted back onto the article.
#[derive(Debug, Clone)]
pub struct PublishedDraft {
    pub id: ArticleId,
    pub draft_id: DraftId,
    pub published_at: DateTime<Utc>,
}
