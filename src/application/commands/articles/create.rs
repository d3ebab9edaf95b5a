// src/application/commands/articles/create.rs
use super::ArticleCommandService;
use crate::{
    application::{dto::ArticleDto, error::ApplicationResult},
    domain::article::{ArticleBody, ArticleId, ArticleTitle, NewArticle, ThemeId},
};
use tracing::info;

pub struct CreateArticleCommand {
    pub title: String,
    pub body: String,
    pub theme: Option<String>,
    pub cover_image: Option<String>,
}

impl CreateArticleCommand {
    pub fn builder() -> CreateArticleCommandBuilder {
        CreateArticleCommandBuilder::default()
    }
}

#[derive(Default)]
pub struct CreateArticleCommandBuilder {
    title: Option<String>,
    body: Option<String>,
    theme: Option<String>,
    cover_image: Option<String>,
}

impl CreateArticleCommandBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn cover_image(mut self, image: impl Into<String>) -> Self {
        self.cover_image = Some(image.into());
        self
    }

    pub fn build(self) -> Result<CreateArticleCommand, &'static str> {
        Ok(CreateArticleCommand {
            title: self.title.ok_or("title is required")?,
            body: self.body.unwrap_or_default(),
            theme: self.theme,
            cover_image: self.cover_image,
        })
    }
}

impl ArticleCommandService {
    pub async fn create_article(&self, command: CreateArticleCommand) -> ApplicationResult<ArticleDto> {
        let title = ArticleTitle::new(command.title)?;
        let body = ArticleBody::new(command.body);
        let theme = command.theme.map(ThemeId::new).unwrap_or_default();
        let cover_image = match command.cover_image {
            Some(value) => Some(self.staged_cover(value).await?),
            None => None,
        };
        let now = self.clock.now();

        let new_article = NewArticle {
            id: ArticleId::generate(),
            title,
            body,
            theme,
            cover_image,
            created_at: now,
            updated_at: now,
        };

        let created = self.write_repo.insert(new_article).await?;
        info!(article = %created.id, "article created");
        Ok(created.into())
    }
}
