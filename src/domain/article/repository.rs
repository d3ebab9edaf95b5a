use crate::domain::article::entity::{Article, ArticleUpdate, NewArticle, PublishedDraft};
use crate::domain::article::value_objects::ArticleId;
use crate::domain::errors::DomainResult;
use async_trait::async_trait;

#[async_trait]
pub trait ArticleWriteRepository: Send + Sync {
    async fn insert(&self, article: NewArticle) -> DomainResult<Article>;
    async fn update(&self, update: ArticleUpdate) -> DomainResult<Article>;
    async fn record_draft(&self, published: PublishedDraft) -> DomainResult<Article>;
}

#[async_trait]
pub trait ArticleReadRepository: Send + Sync {
    async fn find_by_id(&self, id: &ArticleId) -> DomainResult<Option<Article>>;
    /// Most recently updated first.
    async fn list(&self) -> DomainResult<Vec<Article>>;
}
