// tests/support/mocks/media.rs
use async_trait::async_trait;
use bytes::Bytes;
use draft_relay::domain::{
    errors::{DomainError, DomainResult},
    media::{ImageFormat, ImageMeta, ImageRef, MediaStore, StagedImage},
};
use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

pub const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n";

#[derive(Default)]
pub struct MemoryMediaStore {
    images: Mutex<HashMap<ImageRef, Bytes>>,
    loads: AtomicUsize,
}

impl MemoryMediaStore {
    /// Stages a PNG of exactly `size` bytes.
    pub fn put_png(&self, size: usize) -> ImageRef {
        let mut bytes = PNG_HEADER.to_vec();
        bytes.resize(size.max(PNG_HEADER.len()), 0);
        self.put(ImageFormat::Png, Bytes::from(bytes))
    }

    pub fn put(&self, format: ImageFormat, bytes: Bytes) -> ImageRef {
        let image = ImageRef::generate(format);
        self.images.lock().unwrap().insert(image.clone(), bytes);
        image
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

fn not_staged(image: &ImageRef) -> DomainError {
    DomainError::NotFound(format!("image {image} is not staged"))
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn stage(&self, format: ImageFormat, bytes: Bytes) -> DomainResult<ImageRef> {
        Ok(self.put(format, bytes))
    }

    async fn describe(&self, image: &ImageRef) -> DomainResult<ImageMeta> {
        let images = self.images.lock().unwrap();
        let bytes = images.get(image).ok_or_else(|| not_staged(image))?;
        Ok(ImageMeta {
            reference: image.clone(),
            format: image.format(),
            size: bytes.len() as u64,
        })
    }

    async fn load(&self, image: &ImageRef) -> DomainResult<StagedImage> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let bytes = self
            .images
            .lock()
            .unwrap()
            .get(image)
            .cloned()
            .ok_or_else(|| not_staged(image))?;
        Ok(StagedImage {
            reference: image.clone(),
            format: image.format(),
            bytes,
        })
    }
}
