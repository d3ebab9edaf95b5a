pub mod articles;
pub mod media;
pub mod serde_time;
pub mod themes;

pub use articles::{ArticleDto, PublishReceiptDto};
pub use media::StagedImageDto;
pub use themes::ThemeDto;
