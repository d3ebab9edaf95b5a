use std::sync::Arc;

use crate::{application::render::ContentRenderer, domain::article::ArticleReadRepository};

pub struct ArticleQueryService {
    pub(super) read_repo: Arc<dyn ArticleReadRepository>,
    pub(super) renderer: ContentRenderer,
}

impl ArticleQueryService {
    pub fn new(read_repo: Arc<dyn ArticleReadRepository>, renderer: ContentRenderer) -> Self {
        Self {
            read_repo,
            renderer,
        }
    }
}
