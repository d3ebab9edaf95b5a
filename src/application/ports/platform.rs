// src/application/ports/platform.rs
use crate::domain::{article::DraftId, media::StagedImage};
use async_trait::async_trait;
use std::{fmt, time::Duration};
use thiserror::Error;

/// Platform error codes that mean "the access token you sent is not valid".
pub const INVALID_CREDENTIAL_CODES: [i64; 3] = [40001, 40014, 42001];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformError {
    /// The platform answered with an error envelope.
    #[error("platform error {code}: {message}")]
    Api { code: i64, message: String },
    /// The request timed out or the connection failed.
    #[error("platform unreachable: {0}")]
    Timeout(String),
    #[error("unexpected platform response: {0}")]
    InvalidResponse(String),
}

impl PlatformError {
    pub fn api(code: i64, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn rejects_credential(&self) -> bool {
        self.code()
            .is_some_and(|code| INVALID_CREDENTIAL_CODES.contains(&code))
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

// Tokens end up in log fields through Debug; only a prefix is shown.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "AccessToken({prefix}…)")
    }
}

#[derive(Debug, Clone)]
pub struct IssuedCredential {
    pub token: AccessToken,
    pub expires_in: Duration,
}

/// Fully-qualified URL of an image hosted by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformUrl(String);

impl PlatformUrl {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlatformUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of a permanent platform asset (cover images).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaId(String);

impl MediaId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct DraftSubmission {
    pub title: String,
    pub author: Option<String>,
    pub digest: String,
    pub content: String,
    pub cover: Option<MediaId>,
}

/// The credential-issuing endpoint. Only the credential cache calls this.
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    async fn issue(&self) -> Result<IssuedCredential, PlatformError>;
}

#[async_trait]
pub trait PlatformPublisher: Send + Sync {
    async fn upload_inline_image(
        &self,
        token: &AccessToken,
        image: &StagedImage,
    ) -> Result<PlatformUrl, PlatformError>;

    async fn upload_cover_image(
        &self,
        token: &AccessToken,
        image: &StagedImage,
    ) -> Result<MediaId, PlatformError>;

    async fn create_draft(
        &self,
        token: &AccessToken,
        draft: &DraftSubmission,
    ) -> Result<DraftId, PlatformError>;
}
