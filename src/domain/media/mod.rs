pub mod entity;
pub mod repository;
pub mod value_objects;

pub use entity::{ImageMeta, StagedImage};
pub use repository::MediaStore;
pub use value_objects::{ImageFormat, ImageRef};
