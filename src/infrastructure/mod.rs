pub mod database;
pub mod media;
pub mod platform;
pub mod repositories;
pub mod time;
