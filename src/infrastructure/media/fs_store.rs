// src/infrastructure/media/fs_store.rs
use crate::domain::{
    errors::{DomainError, DomainResult},
    media::{ImageFormat, ImageMeta, ImageRef, MediaStore, StagedImage},
};
use async_trait::async_trait;
use bytes::Bytes;
use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::fs;
use tracing::debug;

/// Stages images as flat files named by their [`ImageRef`].
#[derive(Debug, Clone)]
pub struct FsMediaStore {
    root: PathBuf,
}

impl FsMediaStore {
    /// Opens the staging directory, creating it when missing.
    pub async fn open(root: impl Into<PathBuf>) -> DomainResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|err| persistence(&root, &err))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, image: &ImageRef) -> PathBuf {
        self.root.join(image.as_str())
    }
}

fn persistence(path: &Path, err: &io::Error) -> DomainError {
    DomainError::Persistence(format!("{}: {err}", path.display()))
}

fn read_error(image: &ImageRef, path: &Path, err: &io::Error) -> DomainError {
    if err.kind() == io::ErrorKind::NotFound {
        DomainError::NotFound(format!("image {image} is not staged"))
    } else {
        persistence(path, err)
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn stage(&self, format: ImageFormat, bytes: Bytes) -> DomainResult<ImageRef> {
        let image = ImageRef::generate(format);
        let path = self.path_of(&image);
        // Write under a temporary name so readers never observe a partial file.
        let partial = path.with_extension("partial");
        fs::write(&partial, &bytes)
            .await
            .map_err(|err| persistence(&partial, &err))?;
        fs::rename(&partial, &path)
            .await
            .map_err(|err| persistence(&path, &err))?;
        debug!(%image, size = bytes.len(), "image staged");
        Ok(image)
    }

    async fn describe(&self, image: &ImageRef) -> DomainResult<ImageMeta> {
        let path = self.path_of(image);
        let metadata = fs::metadata(&path)
            .await
            .map_err(|err| read_error(image, &path, &err))?;
        if !metadata.is_file() {
            return Err(DomainError::NotFound(format!("image {image} is not staged")));
        }
        Ok(ImageMeta {
            reference: image.clone(),
            format: image.format(),
            size: metadata.len(),
        })
    }

    async fn load(&self, image: &ImageRef) -> DomainResult<StagedImage> {
        let path = self.path_of(image);
        let bytes = fs::read(&path)
            .await
            .map_err(|err| read_error(image, &path, &err))?;
        Ok(StagedImage {
            reference: image.clone(),
            format: image.format(),
            bytes: Bytes::from(bytes),
        })
    }
}
