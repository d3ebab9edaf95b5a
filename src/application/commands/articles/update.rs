use super::ArticleCommandService;
use crate::{
    application::{
        dto::ArticleDto,
        error::{ApplicationError, ApplicationResult},
    },
    domain::article::{ArticleBody, ArticleId, ArticleTitle, ArticleUpdate, ThemeId},
};

pub struct UpdateArticleCommand {
    pub id: String,
    pub title: Option<String>,
    pub body: Option<String>,
    pub theme: Option<String>,
    /// `Some(None)` removes the cover.
    pub cover_image: Option<Option<String>>,
}

impl ArticleCommandService {
    pub async fn update_article(&self, command: UpdateArticleCommand) -> ApplicationResult<ArticleDto> {
        let id = ArticleId::new(command.id)?;
        let mut article = self
            .read_repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("article not found"))?;

        let UpdateArticleCommand {
            id: _,
            title,
            body,
            theme,
            cover_image,
        } = command;

        let title_opt = title.map(ArticleTitle::new).transpose()?;
        let body_opt = body.map(ArticleBody::new);
        let cover_opt = match cover_image {
            Some(Some(value)) => Some(Some(self.staged_cover(value).await?)),
            Some(None) => Some(None),
            None => None,
        };

        let now = self.clock.now();
        let mut update = ArticleUpdate::new(id, now);

        if title_opt.is_some() || body_opt.is_some() {
            let new_title = title_opt.unwrap_or_else(|| article.title.clone());
            let new_body = body_opt.unwrap_or_else(|| article.body.clone());
            article.set_content(new_title.clone(), new_body.clone(), now);
            update = update.with_title(new_title).with_body(new_body);
        }
        if let Some(theme) = theme {
            let theme = ThemeId::new(theme);
            article.set_theme(theme.clone(), now);
            update = update.with_theme(theme);
        }
        if let Some(cover) = cover_opt {
            article.set_cover(cover.clone(), now);
            update = update.with_cover(cover);
        }

        if update.is_empty() {
            return Ok(article.into());
        }

        let updated = self.write_repo.update(update).await?;
        Ok(updated.into())
    }
}
