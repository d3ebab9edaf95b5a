use crate::domain::errors::DomainResult;
use crate::domain::media::entity::{ImageMeta, StagedImage};
use crate::domain::media::value_objects::{ImageFormat, ImageRef};
use async_trait::async_trait;
use bytes::Bytes;

/// Local staging area for images referenced by article bodies.
///
/// Staged content is immutable once written; the publish pipeline only ever
/// calls [`MediaStore::describe`] and [`MediaStore::load`].
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn stage(&self, format: ImageFormat, bytes: Bytes) -> DomainResult<ImageRef>;
    async fn describe(&self, image: &ImageRef) -> DomainResult<ImageMeta>;
    async fn load(&self, image: &ImageRef) -> DomainResult<StagedImage>;
}
