// src/application/commands/articles/publish.rs
use super::ArticleCommandService;
use crate::{
    application::{
        dto::PublishReceiptDto,
        error::{ApplicationError, ApplicationResult},
    },
    domain::article::{ArticleId, PublishedDraft},
};
use tracing::{error, info};

pub struct PublishArticleCommand {
    pub id: String,
}

impl ArticleCommandService {
    /// Publishes the article's current content as a platform draft and
    /// records the returned draft id on the article.
    pub async fn publish_article(
        &self,
        command: PublishArticleCommand,
    ) -> ApplicationResult<PublishReceiptDto> {
        let id = ArticleId::new(command.id)?;
        let article = self
            .read_repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("article not found"))?;

        let draft_id = self.pipeline.publish(&article).await?;
        let published_at = self.clock.now();
        let receipt = PublishReceiptDto::new(&article, &draft_id, published_at);

        // The draft already exists on the platform; failing here would invite
        // a duplicate on retry.
        let record = PublishedDraft {
            id,
            draft_id,
            published_at,
        };
        match self.write_repo.record_draft(record).await {
            Ok(_) => info!(article = %article.id, draft = %receipt.draft_id, "publish recorded"),
            Err(err) => error!(
                article = %article.id,
                draft = %receipt.draft_id,
                error = %err,
                "draft created but recording it failed"
            ),
        }

        Ok(receipt)
    }
}
