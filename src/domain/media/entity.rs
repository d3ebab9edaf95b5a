use crate::domain::media::value_objects::{ImageFormat, ImageRef};
use bytes::Bytes;

/// Size and declared format of a staged image, readable without loading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMeta {
    pub reference: ImageRef,
    pub format: ImageFormat,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct StagedImage {
    pub reference: ImageRef,
    pub format: ImageFormat,
    pub bytes: Bytes,
}

impl StagedImage {
    pub fn meta(&self) -> ImageMeta {
        ImageMeta {
            reference: self.reference.clone(),
            format: self.format,
            size: self.bytes.len() as u64,
        }
    }
}
