// src/presentation/http/state.rs
use crate::application::services::ApplicationServices;
use std::sync::Arc;

/// Digest of the API bearer token. The plain token is never kept in memory
/// past startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthTokenDigest(blake3::Hash);

impl AuthTokenDigest {
    pub fn new(token: &str) -> Self {
        Self(blake3::hash(token.as_bytes()))
    }

    /// `blake3::Hash` equality is constant time.
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == blake3::hash(candidate.as_bytes())
    }
}

#[derive(Clone)]
pub struct HttpState {
    pub services: Arc<ApplicationServices>,
    /// `None` leaves the API open.
    pub auth: Option<AuthTokenDigest>,
}
