// src/application/commands/articles/service.rs
use std::sync::Arc;

use crate::{
    application::{
        error::{ApplicationError, ApplicationResult},
        ports::time::Clock,
        publish::PublishPipeline,
    },
    domain::{
        article::{ArticleReadRepository, ArticleWriteRepository},
        errors::DomainError,
        media::{ImageRef, MediaStore},
    },
};

pub struct ArticleCommandService {
    pub(super) write_repo: Arc<dyn ArticleWriteRepository>,
    pub(super) read_repo: Arc<dyn ArticleReadRepository>,
    pub(super) media_store: Arc<dyn MediaStore>,
    pub(super) pipeline: Arc<PublishPipeline>,
    pub(super) clock: Arc<dyn Clock>,
}

impl ArticleCommandService {
    pub fn new(
        write_repo: Arc<dyn ArticleWriteRepository>,
        read_repo: Arc<dyn ArticleReadRepository>,
        media_store: Arc<dyn MediaStore>,
        pipeline: Arc<PublishPipeline>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            write_repo,
            read_repo,
            media_store,
            pipeline,
            clock,
        }
    }

    /// Parses a cover reference and checks that it is actually staged.
    pub(super) async fn staged_cover(&self, value: String) -> ApplicationResult<ImageRef> {
        let image = ImageRef::parse(value)?;
        match self.media_store.describe(&image).await {
            Ok(_) => Ok(image),
            Err(DomainError::NotFound(_)) => Err(ApplicationError::validation(format!(
                "cover image {image} is not staged"
            ))),
            Err(err) => Err(err.into()),
        }
    }
}
