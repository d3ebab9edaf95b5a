// src/presentation/http/controllers/mod.rs
pub mod articles;
pub mod images;
pub mod preview;
pub mod system;
