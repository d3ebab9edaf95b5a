use std::sync::Arc;

use crate::{
    application::error::{ApplicationError, ApplicationResult},
    domain::{
        errors::DomainError,
        media::{ImageRef, MediaStore, StagedImage},
    },
};

pub struct ImageQueryService {
    store: Arc<dyn MediaStore>,
}

impl ImageQueryService {
    pub fn new(store: Arc<dyn MediaStore>) -> Self {
        Self { store }
    }

    /// Staged image by its reference. Malformed names are reported as not
    /// found so the route cannot be used to probe the staging directory.
    pub async fn load_image(&self, name: &str) -> ApplicationResult<StagedImage> {
        let image = ImageRef::parse(name).map_err(|_| ApplicationError::not_found("image not found"))?;
        match self.store.load(&image).await {
            Ok(staged) => Ok(staged),
            Err(DomainError::NotFound(_)) => Err(ApplicationError::not_found("image not found")),
            Err(err) => Err(err.into()),
        }
    }
}
