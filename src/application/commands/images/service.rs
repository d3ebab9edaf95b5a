use std::sync::Arc;

use crate::{application::render::LocalImageLocator, domain::media::MediaStore};

pub struct ImageCommandService {
    pub(super) store: Arc<dyn MediaStore>,
    pub(super) locator: LocalImageLocator,
}

impl ImageCommandService {
    pub fn new(store: Arc<dyn MediaStore>, locator: LocalImageLocator) -> Self {
        Self { store, locator }
    }
}
