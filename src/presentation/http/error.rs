// src/presentation/http/error.rs
use crate::{
    application::{ApplicationResult, error::ApplicationError, publish::PublishError},
    domain::errors::DomainError,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::ToSchema;

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
    platform_code: Option<i64>,
    image: Option<String>,
    retryable: Option<bool>,
}

impl HttpError {
    pub fn from_error(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            ApplicationError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, msg),
            ApplicationError::Unauthorized(msg) => Self::new(StatusCode::UNAUTHORIZED, msg),
            ApplicationError::Infrastructure(msg) => {
                error!(%msg, "infrastructure failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            ApplicationError::Domain(domain_err) => Self::from_domain(domain_err),
            ApplicationError::Publish(publish_err) => Self::from_publish(&publish_err),
        }
    }

    fn from_domain(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            DomainError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, msg),
            DomainError::Persistence(msg) => {
                error!(%msg, "persistence failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        }
    }

    fn from_publish(err: &PublishError) -> Self {
        let status = match err {
            PublishError::CredentialUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            PublishError::UnsupportedMedia { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PublishError::MediaMigrationFailed { .. } | PublishError::DraftRejected { .. } => {
                StatusCode::BAD_GATEWAY
            }
            PublishError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        };
        warn!(error = %err, status = status.as_u16(), "publish failed");
        Self {
            status,
            message: err.to_string(),
            platform_code: err.platform_code(),
            image: err.image().map(ToString::to_string),
            retryable: Some(err.is_transient()),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message.into())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn new(status: StatusCode, message: String) -> Self {
        Self {
            status,
            message,
            platform_code: None,
            image: None,
            retryable: None,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let payload = ErrorResponse {
            error: self
                .status
                .canonical_reason()
                .unwrap_or("error")
                .to_string(),
            message: self.message,
            platform_code: self.platform_code,
            image: self.image,
            retryable: self.retryable,
        };
        (self.status, Json(payload)).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// `errcode` reported by the platform, when it reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_code: Option<i64>,
    /// Staged image the failure is about.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Publish failures only: whether the same request may succeed later.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

pub type HttpResult<T> = Result<T, HttpError>;

pub trait IntoHttpResult<T> {
    fn into_http(self) -> HttpResult<T>;
}

impl<T> IntoHttpResult<T> for ApplicationResult<T> {
    fn into_http(self) -> HttpResult<T> {
        self.map_err(HttpError::from_error)
    }
}
