pub mod articles;
pub mod images;
