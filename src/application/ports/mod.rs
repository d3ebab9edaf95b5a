// src/application/ports/mod.rs
pub mod platform;
pub mod time;
