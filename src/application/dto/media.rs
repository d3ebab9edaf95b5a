use crate::domain::media::ImageMeta;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StagedImageDto {
    /// Reference to use as `cover_image`.
    pub image: String,
    pub mime_type: String,
    pub size: u64,
    /// Local URL the image is served from until it is published.
    pub url: String,
    /// Ready-to-paste markdown embedding the image.
    pub markdown: String,
}

impl StagedImageDto {
    pub fn new(meta: ImageMeta, url: String) -> Self {
        Self {
            image: meta.reference.to_string(),
            mime_type: meta.format.mime_type().to_string(),
            size: meta.size,
            markdown: format!("![image]({url})"),
            url,
        }
    }
}
