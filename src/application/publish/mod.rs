// src/application/publish/mod.rs
//! The publish pipeline: render, migrate media, submit the draft.
//!
//! Every step before `SubmitDraft` is free of platform-visible effects apart
//! from image uploads, which the migrator caches for the next attempt. Nothing
//! here retries; a failed step ends the attempt with a typed error.

mod error;

pub use error::{MediaRejection, MigrationFailure, PublishError, PublishStep};

use crate::{
    application::{
        credentials::{Credential, CredentialCache},
        media::MediaMigrator,
        ports::platform::{DraftSubmission, PlatformError, PlatformPublisher, PlatformUrl},
        render::ContentRenderer,
    },
    domain::{
        article::{Article, DraftId},
        media::ImageRef,
    },
};
use futures::{StreamExt, TryStreamExt, stream};
use std::{collections::HashMap, sync::Arc};
use tracing::{Instrument, debug, info, info_span, warn};

pub const DEFAULT_UPLOAD_CONCURRENCY: usize = 4;
/// Characters of the title sent as the draft digest.
pub const DIGEST_CHARS: usize = 50;

#[derive(Debug, Clone)]
pub struct PublishSettings {
    pub upload_concurrency: usize,
    pub author: Option<String>,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            upload_concurrency: DEFAULT_UPLOAD_CONCURRENCY,
            author: None,
        }
    }
}

pub struct PublishPipeline {
    renderer: ContentRenderer,
    credentials: Arc<CredentialCache>,
    migrator: Arc<MediaMigrator>,
    platform: Arc<dyn PlatformPublisher>,
    settings: PublishSettings,
}

impl PublishPipeline {
    pub fn new(
        renderer: ContentRenderer,
        credentials: Arc<CredentialCache>,
        migrator: Arc<MediaMigrator>,
        platform: Arc<dyn PlatformPublisher>,
        settings: PublishSettings,
    ) -> Self {
        Self {
            renderer,
            credentials,
            migrator,
            platform,
            settings,
        }
    }

    pub fn renderer(&self) -> &ContentRenderer {
        &self.renderer
    }

    pub fn credentials(&self) -> &CredentialCache {
        &self.credentials
    }

    /// Runs one publish attempt and returns the platform draft id.
    pub async fn publish(&self, article: &Article) -> Result<DraftId, PublishError> {
        let span = info_span!("publish", article = %article.id);
        self.run(article).instrument(span).await
    }

    async fn run(&self, article: &Article) -> Result<DraftId, PublishError> {
        debug!(step = %PublishStep::RenderMarkup, theme = %article.theme);
        let mut markup = self.renderer.render(article.body.as_str(), &article.theme);
        for src in markup.external_images() {
            warn!(%src, "image is not staged locally and is submitted unchanged");
        }
        let inline_images = markup.local_images();

        debug!(step = %PublishStep::Preflight, images = inline_images.len());
        if let Some(cover) = &article.cover_image {
            self.migrator.validate(cover).await?;
        }
        for image in &inline_images {
            self.migrator.validate(image).await?;
        }

        let cover = match &article.cover_image {
            Some(image) => {
                debug!(step = %PublishStep::ResolveCover, %image);
                let credential = self.credentials.acquire().await?;
                let media_id = self
                    .migrator
                    .migrate_cover(image, credential.token())
                    .await
                    .inspect_err(|err| self.on_platform_error(&credential, err.platform_error()))?;
                Some(media_id)
            }
            None => None,
        };

        if !inline_images.is_empty() {
            debug!(step = %PublishStep::ResolveInlineImages, images = inline_images.len());
            let resolved = self.resolve_inline(inline_images).await?;
            markup
                .resolve_images(|image| resolved.get(image).map(|url| url.as_str().to_string()))
                .map_err(|image| {
                    PublishError::migration(
                        &image,
                        PlatformError::InvalidResponse("no platform url was returned".into()),
                    )
                })?;
        }

        debug!(step = %PublishStep::SubmitDraft);
        let submission = DraftSubmission {
            title: article.title.as_str().to_string(),
            author: self.settings.author.clone(),
            digest: article.title.digest(DIGEST_CHARS),
            content: markup.to_html(),
            cover,
        };
        let credential = self.credentials.acquire().await?;
        let draft_id = self
            .platform
            .create_draft(credential.token(), &submission)
            .await
            .map_err(|err| {
                self.on_platform_error(&credential, Some(&err));
                draft_error(err)
            })?;

        info!(%draft_id, "draft created");
        Ok(draft_id)
    }

    /// Uploads every inline image with bounded concurrency. The first failure
    /// drops the uploads still in flight.
    async fn resolve_inline(
        &self,
        images: Vec<ImageRef>,
    ) -> Result<HashMap<ImageRef, PlatformUrl>, PublishError> {
        let credential = self.credentials.acquire().await?;
        let token = credential.token();
        let migrator = &self.migrator;

        stream::iter(images)
            .map(|image| async move {
                let url = migrator.migrate_inline(&image, token).await?;
                Ok::<_, PublishError>((image, url))
            })
            .buffer_unordered(self.settings.upload_concurrency.max(1))
            .try_collect()
            .await
            .inspect_err(|err| self.on_platform_error(&credential, err.platform_error()))
    }

    fn on_platform_error(&self, credential: &Credential, err: Option<&PlatformError>) {
        if err.is_some_and(PlatformError::rejects_credential) {
            self.credentials.invalidate(credential.token());
        }
    }
}

fn draft_error(err: PlatformError) -> PublishError {
    match err {
        PlatformError::Api { code, message } => PublishError::DraftRejected { code, message },
        PlatformError::Timeout(detail) => PublishError::Timeout {
            step: PublishStep::SubmitDraft,
            detail,
        },
        PlatformError::InvalidResponse(message) => PublishError::DraftRejected {
            code: -1,
            message,
        },
    }
}
