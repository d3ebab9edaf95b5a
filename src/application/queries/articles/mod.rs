mod get_by_id;
mod list;
mod preview;
mod service;

pub use get_by_id::GetArticleByIdQuery;
pub use preview::{ArticlePreview, PreviewArticleQuery};
pub use service::ArticleQueryService;
