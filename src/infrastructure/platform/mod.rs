// src/infrastructure/platform/mod.rs
mod wechat;

pub use wechat::{DEFAULT_API_BASE, WeChatClient, WeChatSettings};
