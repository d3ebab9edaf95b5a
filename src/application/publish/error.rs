// src/application/publish/error.rs
use crate::{
    application::{credentials::CredentialUnavailable, ports::platform::PlatformError},
    domain::media::{ImageFormat, ImageRef},
};
use std::fmt;
use thiserror::Error;

/// Steps of a publish attempt, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStep {
    RenderMarkup,
    Preflight,
    ResolveCover,
    ResolveInlineImages,
    SubmitDraft,
}

impl PublishStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RenderMarkup => "render_markup",
            Self::Preflight => "preflight",
            Self::ResolveCover => "resolve_cover",
            Self::ResolveInlineImages => "resolve_inline_images",
            Self::SubmitDraft => "submit_draft",
        }
    }
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an image was refused before any upload was attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaRejection {
    TooLarge { size: u64, limit: u64 },
    Format(ImageFormat),
}

impl fmt::Display for MediaRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLarge { size, limit } => {
                write!(f, "{size} bytes exceeds the {limit} byte limit")
            }
            Self::Format(format) => write!(f, "{format} is not accepted (jpeg or png only)"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MigrationFailure {
    #[error("staged image unreadable: {0}")]
    Staging(String),
    #[error(transparent)]
    Platform(PlatformError),
}

impl MigrationFailure {
    pub fn platform(&self) -> Option<&PlatformError> {
        match self {
            Self::Platform(err) => Some(err),
            Self::Staging(_) => None,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum PublishError {
    #[error("platform credential unavailable: {cause}")]
    CredentialUnavailable { cause: PlatformError },

    #[error("image {image} is not publishable: {reason}")]
    UnsupportedMedia {
        image: ImageRef,
        reason: MediaRejection,
    },

    #[error("migrating image {image} failed: {cause}")]
    MediaMigrationFailed {
        image: ImageRef,
        cause: MigrationFailure,
    },

    #[error("platform rejected the draft ({code}): {message}")]
    DraftRejected { code: i64, message: String },

    #[error("{step} timed out: {detail}")]
    Timeout { step: PublishStep, detail: String },
}

impl PublishError {
    pub(crate) fn migration(image: &ImageRef, cause: PlatformError) -> Self {
        Self::MediaMigrationFailed {
            image: image.clone(),
            cause: MigrationFailure::Platform(cause),
        }
    }

    pub(crate) fn staging(image: &ImageRef, detail: impl Into<String>) -> Self {
        Self::MediaMigrationFailed {
            image: image.clone(),
            cause: MigrationFailure::Staging(detail.into()),
        }
    }

    /// The platform error that caused this failure, if any.
    pub fn platform_error(&self) -> Option<&PlatformError> {
        match self {
            Self::CredentialUnavailable { cause } => Some(cause),
            Self::MediaMigrationFailed { cause, .. } => cause.platform(),
            _ => None,
        }
    }

    pub fn platform_code(&self) -> Option<i64> {
        match self {
            Self::DraftRejected { code, .. } => Some(*code),
            other => other.platform_error().and_then(PlatformError::code),
        }
    }

    /// The image the failure is about, for `UnsupportedMedia` and
    /// `MediaMigrationFailed`.
    pub fn image(&self) -> Option<&ImageRef> {
        match self {
            Self::UnsupportedMedia { image, .. } | Self::MediaMigrationFailed { image, .. } => {
                Some(image)
            }
            _ => None,
        }
    }

    /// Whether retrying the same publish later can succeed without anyone
    /// changing the article. The pipeline itself never retries.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::CredentialUnavailable { cause } => cause.is_transient(),
            Self::UnsupportedMedia { .. } => false,
            Self::MediaMigrationFailed { cause, .. } => cause
                .platform()
                .is_some_and(|err| err.is_transient() || err.rejects_credential()),
            Self::DraftRejected { code, .. } => {
                PlatformError::api(*code, String::new()).rejects_credential()
            }
            Self::Timeout { .. } => true,
        }
    }
}

impl From<CredentialUnavailable> for PublishError {
    fn from(err: CredentialUnavailable) -> Self {
        Self::CredentialUnavailable { cause: err.cause }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> ImageRef {
        ImageRef::parse("abc123.png").unwrap()
    }

    #[test]
    fn rejected_credential_on_draft_is_transient() {
        let err = PublishError::DraftRejected {
            code: 40001,
            message: "invalid credential".into(),
        };
        assert!(err.is_transient());
        assert_eq!(err.platform_code(), Some(40001));

        let malformed = PublishError::DraftRejected {
            code: 45166,
            message: "invalid content".into(),
        };
        assert!(!malformed.is_transient());
    }

    #[test]
    fn unsupported_media_is_permanent() {
        let err = PublishError::UnsupportedMedia {
            image: image(),
            reason: MediaRejection::TooLarge {
                size: 2_000_000,
                limit: 1_048_576,
            },
        };
        assert!(!err.is_transient());
        assert_eq!(err.image(), Some(&image()));
        assert!(err.to_string().contains("2000000 bytes"));
    }

    #[test]
    fn migration_failure_keeps_platform_code() {
        let err = PublishError::migration(&image(), PlatformError::api(40005, "invalid file type"));
        assert_eq!(err.platform_code(), Some(40005));
        assert!(!err.is_transient());

        let timed_out = PublishError::migration(&image(), PlatformError::Timeout("deadline".into()));
        assert!(timed_out.is_transient());
        assert_eq!(timed_out.platform_code(), None);
    }
}
