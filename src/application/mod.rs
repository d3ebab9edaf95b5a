pub mod commands;
pub mod credentials;
pub mod dto;
pub mod error;
pub mod media;
pub mod ports;
pub mod publish;
pub mod queries;
pub mod render;
pub mod services;

pub use error::ApplicationResult;
