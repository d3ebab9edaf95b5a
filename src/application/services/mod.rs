// src/application/services/mod.rs
use std::{sync::Arc, time::Duration};

use crate::{
    application::{
        commands::{articles::ArticleCommandService, images::ImageCommandService},
        credentials::{CredentialCache, CredentialStatus, DEFAULT_REFRESH_MARGIN},
        dto::ThemeDto,
        media::{DEFAULT_IMAGE_HOST, MediaMigrator},
        ports::{
            platform::{CredentialIssuer, PlatformPublisher},
            time::Clock,
        },
        publish::{PublishPipeline, PublishSettings},
        queries::{articles::ArticleQueryService, images::ImageQueryService},
        render::{ContentRenderer, LocalImageLocator},
    },
    domain::{
        article::{ArticleReadRepository, ArticleWriteRepository},
        media::MediaStore,
    },
};

/// Knobs the services are wired with; filled from `AppConfig` at startup.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub public_base_url: String,
    pub image_host: String,
    pub refresh_margin: Duration,
    pub publish: PublishSettings,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            public_base_url: "http://127.0.0.1:8080".into(),
            image_host: DEFAULT_IMAGE_HOST.into(),
            refresh_margin: DEFAULT_REFRESH_MARGIN,
            publish: PublishSettings::default(),
        }
    }
}

pub struct ApplicationServices {
    pub article_commands: Arc<ArticleCommandService>,
    pub article_queries: Arc<ArticleQueryService>,
    pub image_commands: Arc<ImageCommandService>,
    pub image_queries: Arc<ImageQueryService>,
    pipeline: Arc<PublishPipeline>,
}

impl ApplicationServices {
    pub fn new(
        article_write_repo: Arc<dyn ArticleWriteRepository>,
        article_read_repo: Arc<dyn ArticleReadRepository>,
        media_store: Arc<dyn MediaStore>,
        credential_issuer: Arc<dyn CredentialIssuer>,
        platform: Arc<dyn PlatformPublisher>,
        clock: Arc<dyn Clock>,
        settings: ServiceSettings,
    ) -> Self {
        let locator = LocalImageLocator::new(&settings.public_base_url);
        let renderer = ContentRenderer::new(locator.clone());

        let credentials = Arc::new(CredentialCache::new(
            credential_issuer,
            settings.refresh_margin,
        ));
        let migrator = Arc::new(MediaMigrator::new(
            Arc::clone(&media_store),
            Arc::clone(&platform),
            settings.image_host,
        ));
        let pipeline = Arc::new(PublishPipeline::new(
            renderer.clone(),
            credentials,
            migrator,
            platform,
            settings.publish,
        ));

        let article_commands = Arc::new(ArticleCommandService::new(
            Arc::clone(&article_write_repo),
            Arc::clone(&article_read_repo),
            Arc::clone(&media_store),
            Arc::clone(&pipeline),
            Arc::clone(&clock),
        ));
        let article_queries = Arc::new(ArticleQueryService::new(
            Arc::clone(&article_read_repo),
            renderer,
        ));
        let image_commands = Arc::new(ImageCommandService::new(
            Arc::clone(&media_store),
            locator,
        ));
        let image_queries = Arc::new(ImageQueryService::new(media_store));

        Self {
            article_commands,
            article_queries,
            image_commands,
            image_queries,
            pipeline,
        }
    }

    pub fn credential_status(&self) -> CredentialStatus {
        self.pipeline.credentials().status()
    }

    pub fn themes(&self) -> Vec<ThemeDto> {
        self.pipeline.renderer().themes().map(ThemeDto::from).collect()
    }
}
