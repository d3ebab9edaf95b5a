// tests/support/mocks/article_repos.rs
use async_trait::async_trait;
use draft_relay::domain::{
    article::{
        Article, ArticleId, ArticleReadRepository, ArticleUpdate, ArticleWriteRepository,
        NewArticle, PublishedDraft,
    },
    errors::{DomainError, DomainResult},
};
use std::{collections::HashMap, sync::Mutex};

/// Article store backing both repository traits.
#[derive(Default)]
pub struct InMemoryArticles {
    rows: Mutex<HashMap<ArticleId, Article>>,
}

impl InMemoryArticles {
    pub fn get(&self, id: &ArticleId) -> Option<Article> {
        self.rows.lock().unwrap().get(id).cloned()
    }

    pub fn put(&self, article: Article) {
        self.rows.lock().unwrap().insert(article.id.clone(), article);
    }
}

fn missing(id: &ArticleId) -> DomainError {
    DomainError::NotFound(format!("article {id} not found"))
}

#[async_trait]
impl ArticleWriteRepository for InMemoryArticles {
    async fn insert(&self, article: NewArticle) -> DomainResult<Article> {
        let created = Article {
            id: article.id,
            title: article.title,
            body: article.body,
            theme: article.theme,
            cover_image: article.cover_image,
            created_at: article.created_at,
            updated_at: article.updated_at,
            published_at: None,
            draft_id: None,
        };
        self.put(created.clone());
        Ok(created)
    }

    async fn update(&self, update: ArticleUpdate) -> DomainResult<Article> {
        let mut rows = self.rows.lock().unwrap();
        let article = rows.get_mut(&update.id).ok_or_else(|| missing(&update.id))?;
        if let Some(title) = update.title {
            article.title = title;
        }
        if let Some(body) = update.body {
            article.body = body;
        }
        if let Some(theme) = update.theme {
            article.theme = theme;
        }
        if let Some(cover) = update.cover_image {
            article.cover_image = cover;
        }
        article.updated_at = update.updated_at;
        Ok(article.clone())
    }

    async fn record_draft(&self, published: PublishedDraft) -> DomainResult<Article> {
        let mut rows = self.rows.lock().unwrap();
        let article = rows
            .get_mut(&published.id)
            .ok_or_else(|| missing(&published.id))?;
        article.record_draft(published.draft_id, published.published_at);
        Ok(article.clone())
    }
}

#[async_trait]
impl ArticleReadRepository for InMemoryArticles {
    async fn find_by_id(&self, id: &ArticleId) -> DomainResult<Option<Article>> {
        Ok(self.get(id))
    }

    async fn list(&self) -> DomainResult<Vec<Article>> {
        let mut articles: Vec<Article> = self.rows.lock().unwrap().values().cloned().collect();
        articles.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(articles)
    }
}
