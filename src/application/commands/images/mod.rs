// src/application/commands/images/mod.rs
mod stage;
mod service;

pub use service::ImageCommandService;
pub use stage::{MAX_STAGED_BYTES, StageImageCommand};
