// src/application/media.rs
//! Moves staged images onto the platform's permanent hosting.
//!
//! Inline images and covers go to different endpoints and come back in
//! different shapes, so each has its own cache. A cache hit never touches the
//! network; concurrent migrations of one reference share one upload.

use crate::{
    application::{
        ports::platform::{AccessToken, MediaId, PlatformError, PlatformPublisher, PlatformUrl},
        publish::{MediaRejection, PublishError},
    },
    domain::{
        errors::DomainError,
        media::{ImageFormat, ImageMeta, ImageRef, MediaStore},
    },
};
use moka::future::Cache;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Largest image the platform accepts, in bytes.
pub const MAX_MEDIA_BYTES: u64 = 1_048_576;
pub const DEFAULT_IMAGE_HOST: &str = "qpic.cn";

const CACHE_CAPACITY: u64 = 10_000;

pub struct MediaMigrator {
    store: Arc<dyn MediaStore>,
    platform: Arc<dyn PlatformPublisher>,
    image_host: String,
    inline: Cache<ImageRef, PlatformUrl>,
    covers: Cache<ImageRef, MediaId>,
}

impl MediaMigrator {
    pub fn new(
        store: Arc<dyn MediaStore>,
        platform: Arc<dyn PlatformPublisher>,
        image_host: impl Into<String>,
    ) -> Self {
        Self {
            store,
            platform,
            image_host: image_host.into().trim_start_matches('.').to_ascii_lowercase(),
            inline: Cache::new(CACHE_CAPACITY),
            covers: Cache::new(CACHE_CAPACITY),
        }
    }

    /// Checks size and format from the staged metadata. No network, no
    /// credential.
    pub async fn validate(&self, image: &ImageRef) -> Result<ImageMeta, PublishError> {
        let meta = self
            .store
            .describe(image)
            .await
            .map_err(|err| staging_error(image, err))?;

        if !matches!(meta.format, ImageFormat::Jpeg | ImageFormat::Png) {
            return Err(PublishError::UnsupportedMedia {
                image: image.clone(),
                reason: MediaRejection::Format(meta.format),
            });
        }
        if meta.size > MAX_MEDIA_BYTES {
            return Err(PublishError::UnsupportedMedia {
                image: image.clone(),
                reason: MediaRejection::TooLarge {
                    size: meta.size,
                    limit: MAX_MEDIA_BYTES,
                },
            });
        }
        Ok(meta)
    }

    pub async fn migrate_inline(
        &self,
        image: &ImageRef,
        token: &AccessToken,
    ) -> Result<PlatformUrl, PublishError> {
        if let Some(url) = self.inline.get(image).await {
            debug!(%image, "inline image already migrated");
            return Ok(url);
        }
        self.validate(image).await?;

        let store = Arc::clone(&self.store);
        let platform = Arc::clone(&self.platform);
        let host = self.image_host.clone();
        let token = token.clone();
        let key = image.clone();

        self.inline
            .try_get_with(image.clone(), async move {
                let staged = store.load(&key).await.map_err(|err| staging_error(&key, err))?;
                let url = platform
                    .upload_inline_image(&token, &staged)
                    .await
                    .map_err(|err| PublishError::migration(&key, err))?;
                ensure_platform_host(&url, &host)
                    .map_err(|err| PublishError::migration(&key, err))?;
                info!(image = %key, %url, "inline image migrated");
                Ok::<_, PublishError>(url)
            })
            .await
            .map_err(|err: Arc<PublishError>| (*err).clone())
    }

    pub async fn migrate_cover(
        &self,
        image: &ImageRef,
        token: &AccessToken,
    ) -> Result<MediaId, PublishError> {
        if let Some(media_id) = self.covers.get(image).await {
            debug!(%image, "cover image already migrated");
            return Ok(media_id);
        }
        self.validate(image).await?;

        let store = Arc::clone(&self.store);
        let platform = Arc::clone(&self.platform);
        let token = token.clone();
        let key = image.clone();

        self.covers
            .try_get_with(image.clone(), async move {
                let staged = store.load(&key).await.map_err(|err| staging_error(&key, err))?;
                let media_id = platform
                    .upload_cover_image(&token, &staged)
                    .await
                    .map_err(|err| PublishError::migration(&key, err))?;
                info!(image = %key, %media_id, "cover image migrated");
                Ok::<_, PublishError>(media_id)
            })
            .await
            .map_err(|err: Arc<PublishError>| (*err).clone())
    }
}

fn staging_error(image: &ImageRef, err: DomainError) -> PublishError {
    PublishError::staging(image, err.to_string())
}

/// Inline URLs must live on the platform's image host; the platform drops
/// any other domain from submitted markup.
fn ensure_platform_host(url: &PlatformUrl, host: &str) -> Result<(), PlatformError> {
    let parsed = Url::parse(url.as_str()).map_err(|err| {
        PlatformError::InvalidResponse(format!("inline image url `{url}` is malformed: {err}"))
    })?;
    let on_host = parsed.host_str().is_some_and(|candidate| {
        let candidate = candidate.to_ascii_lowercase();
        candidate == host || candidate.ends_with(&format!(".{host}"))
    });
    if on_host {
        Ok(())
    } else {
        Err(PlatformError::InvalidResponse(format!(
            "inline image url `{url}` is not hosted on {host}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application::{ports::platform::DraftSubmission, publish::MigrationFailure},
        domain::{article::DraftId, errors::DomainResult, media::StagedImage},
    };
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::{
        collections::HashMap,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    #[derive(Default)]
    struct MemoryStore {
        images: Mutex<HashMap<ImageRef, StagedImage>>,
    }

    impl MemoryStore {
        fn put(&self, name: &str, size: usize) -> ImageRef {
            let image = ImageRef::parse(name).unwrap();
            let staged = StagedImage {
                reference: image.clone(),
                format: image.format(),
                bytes: Bytes::from(vec![0_u8; size]),
            };
            self.images.lock().unwrap().insert(image.clone(), staged);
            image
        }
    }

    #[async_trait]
    impl MediaStore for MemoryStore {
        async fn stage(&self, _format: ImageFormat, _bytes: Bytes) -> DomainResult<ImageRef> {
            unimplemented!("not used by the migrator")
        }

        async fn describe(&self, image: &ImageRef) -> DomainResult<ImageMeta> {
            self.load(image).await.map(|staged| staged.meta())
        }

        async fn load(&self, image: &ImageRef) -> DomainResult<StagedImage> {
            self.images
                .lock()
                .unwrap()
                .get(image)
                .cloned()
                .ok_or_else(|| DomainError::NotFound(format!("image {image}")))
        }
    }

    struct CountingPlatform {
        uploads: AtomicUsize,
        host: &'static str,
    }

    impl CountingPlatform {
        fn new(host: &'static str) -> Self {
            Self {
                uploads: AtomicUsize::new(0),
                host,
            }
        }

        fn uploads(&self) -> usize {
            self.uploads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PlatformPublisher for CountingPlatform {
        async fn upload_inline_image(
            &self,
            _token: &AccessToken,
            image: &StagedImage,
        ) -> Result<PlatformUrl, PlatformError> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(PlatformUrl::new(format!("https://{}/mmbiz/{}", self.host, image.reference)))
        }

        async fn upload_cover_image(
            &self,
            _token: &AccessToken,
            image: &StagedImage,
        ) -> Result<MediaId, PlatformError> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            Ok(MediaId::new(format!("media-{}", image.reference)))
        }

        async fn create_draft(
            &self,
            _token: &AccessToken,
            _draft: &DraftSubmission,
        ) -> Result<DraftId, PlatformError> {
            unimplemented!("not used by the migrator")
        }
    }

    fn migrator(store: &Arc<MemoryStore>, platform: &Arc<CountingPlatform>) -> MediaMigrator {
        MediaMigrator::new(store.clone(), platform.clone(), DEFAULT_IMAGE_HOST)
    }

    fn token() -> AccessToken {
        AccessToken::new("token-1")
    }

    #[tokio::test]
    async fn second_migration_is_served_from_cache() {
        let store = Arc::new(MemoryStore::default());
        let platform = Arc::new(CountingPlatform::new("mmbiz.qpic.cn"));
        let migrator = migrator(&store, &platform);
        let image = store.put("aa01.png", 1024);

        let first = migrator.migrate_inline(&image, &token()).await.unwrap();
        let second = migrator.migrate_inline(&image, &token()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(platform.uploads(), 1);
    }

    #[tokio::test]
    async fn concurrent_migrations_share_one_upload() {
        let store = Arc::new(MemoryStore::default());
        let platform = Arc::new(CountingPlatform::new("mmbiz.qpic.cn"));
        let migrator = migrator(&store, &platform);
        let image = store.put("bb02.jpg", 2048);
        let token = token();

        let (a, b) = tokio::join!(
            migrator.migrate_inline(&image, &token),
            migrator.migrate_inline(&image, &token)
        );
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(platform.uploads(), 1);
    }

    #[tokio::test]
    async fn inline_and_cover_caches_are_separate() {
        let store = Arc::new(MemoryStore::default());
        let platform = Arc::new(CountingPlatform::new("mmbiz.qpic.cn"));
        let migrator = migrator(&store, &platform);
        let image = store.put("cc03.png", 10);

        migrator.migrate_inline(&image, &token()).await.unwrap();
        let media_id = migrator.migrate_cover(&image, &token()).await.unwrap();
        migrator.migrate_cover(&image, &token()).await.unwrap();

        assert_eq!(media_id.as_str(), "media-cc03.png");
        assert_eq!(platform.uploads(), 2);
    }

    #[tokio::test]
    async fn oversized_image_fails_without_network() {
        let store = Arc::new(MemoryStore::default());
        let platform = Arc::new(CountingPlatform::new("mmbiz.qpic.cn"));
        let migrator = migrator(&store, &platform);
        let limit = usize::try_from(MAX_MEDIA_BYTES).unwrap();
        let at_limit = store.put("dd04.png", limit);
        let too_big = store.put("ee05.png", limit + 1);

        assert!(migrator.validate(&at_limit).await.is_ok());
        let err = migrator.migrate_inline(&too_big, &token()).await.unwrap_err();
        assert!(matches!(
            err,
            PublishError::UnsupportedMedia {
                reason: MediaRejection::TooLarge { .. },
                ..
            }
        ));
        assert_eq!(platform.uploads(), 0);
    }

    #[tokio::test]
    async fn unsupported_format_fails_without_network() {
        let store = Arc::new(MemoryStore::default());
        let platform = Arc::new(CountingPlatform::new("mmbiz.qpic.cn"));
        let migrator = migrator(&store, &platform);
        let gif = store.put("ff06.gif", 10);

        let err = migrator.migrate_cover(&gif, &token()).await.unwrap_err();
        assert!(matches!(
            err,
            PublishError::UnsupportedMedia {
                reason: MediaRejection::Format(ImageFormat::Gif),
                ..
            }
        ));
        assert_eq!(platform.uploads(), 0);
    }

    #[tokio::test]
    async fn missing_staged_file_is_a_migration_failure() {
        let store = Arc::new(MemoryStore::default());
        let platform = Arc::new(CountingPlatform::new("mmbiz.qpic.cn"));
        let migrator = migrator(&store, &platform);
        let ghost = ImageRef::parse("aabb.png").unwrap();

        let err = migrator.migrate_inline(&ghost, &token()).await.unwrap_err();
        assert!(matches!(
            err,
            PublishError::MediaMigrationFailed {
                cause: MigrationFailure::Staging(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn foreign_host_is_rejected_and_not_cached() {
        let store = Arc::new(MemoryStore::default());
        let platform = Arc::new(CountingPlatform::new("cdn.example.com"));
        let migrator = migrator(&store, &platform);
        let image = store.put("ab07.png", 10);

        for _ in 0..2 {
            let err = migrator.migrate_inline(&image, &token()).await.unwrap_err();
            assert!(matches!(err, PublishError::MediaMigrationFailed { .. }));
        }
        assert_eq!(platform.uploads(), 2);
    }

    #[test]
    fn host_check_accepts_subdomains_only() {
        let ok = PlatformUrl::new("http://mmbiz.qpic.cn/mmbiz_png/abc/0");
        assert!(ensure_platform_host(&ok, "qpic.cn").is_ok());
        let spoof = PlatformUrl::new("https://qpic.cn.evil.com/x.png");
        assert!(ensure_platform_host(&spoof, "qpic.cn").is_err());
        let garbage = PlatformUrl::new("not a url");
        assert!(ensure_platform_host(&garbage, "qpic.cn").is_err());
    }
}
