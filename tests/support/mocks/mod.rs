// tests/support/mocks/mod.rs
pub mod article_repos;
pub mod media;
pub mod platform;
pub mod time;

pub use article_repos::InMemoryArticles;
pub use media::MemoryMediaStore;
pub use platform::{FakePlatform, ScriptedIssuer};
pub use time::{FixedClock, fixed_now};
