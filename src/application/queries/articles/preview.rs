use super::ArticleQueryService;
use crate::{
    application::error::{ApplicationError, ApplicationResult},
    domain::article::ArticleId,
};

pub struct PreviewArticleQuery {
    pub id: String,
}

/// Rendered article as the preview page shows it. Local images keep their
/// local URLs.
#[derive(Debug, Clone)]
pub struct ArticlePreview {
    pub title: String,
    pub theme: String,
    pub markup: String,
}

impl ArticleQueryService {
    pub async fn preview_article(&self, query: PreviewArticleQuery) -> ApplicationResult<ArticlePreview> {
        let id = ArticleId::new(query.id)?;
        let article = self
            .read_repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("article not found"))?;

        Ok(ArticlePreview {
            markup: self.renderer.render_preview(article.body.as_str(), &article.theme),
            title: article.title.into(),
            theme: article.theme.to_string(),
        })
    }
}
