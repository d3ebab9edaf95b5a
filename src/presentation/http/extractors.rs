// src/presentation/http/extractors.rs
use crate::{
    application::error::ApplicationError,
    presentation::http::{error::HttpError, state::HttpState},
};
use axum::{Extension, extract::FromRequestParts, http::request::Parts};
use headers::{Authorization, HeaderMapExt, authorization::Bearer};

/// Guard for `/api` handlers: passes when no token is configured or the
/// request carries the configured bearer token.
#[derive(Debug, Clone, Copy)]
pub struct Authorized;

impl<S> FromRequestParts<S> for Authorized
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state) = Extension::<HttpState>::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                HttpError::from_error(ApplicationError::infrastructure(
                    "application state missing",
                ))
            })?;

        let Some(expected) = app_state.auth.as_ref() else {
            return Ok(Self);
        };

        let header = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .ok_or_else(|| HttpError::unauthorized("missing Authorization header"))?;

        if expected.matches(header.token()) {
            Ok(Self)
        } else {
            Err(HttpError::unauthorized("invalid bearer token"))
        }
    }
}
