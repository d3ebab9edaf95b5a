pub mod entity;
pub mod repository;
pub mod value_objects;

pub use entity::{Article, ArticleUpdate, NewArticle, PublishedDraft};
pub use repository::{ArticleReadRepository, ArticleWriteRepository};
pub use value_objects::{ArticleBody, ArticleId, ArticleTitle, DraftId, ThemeId};
