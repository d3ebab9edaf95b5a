// src/presentation/http/controllers/system.rs
use crate::application::{credentials::CredentialStatus, dto::ThemeDto};
use crate::presentation::http::extractors::Authorized;
use crate::presentation::http::state::HttpState;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// `absent`, `valid` or `refreshing`.
    pub credential: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_expires_in: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health and platform credential state.", body = HealthResponse)
    ),
    security([]),
    tag = "System"
)]
pub async fn health(Extension(state): Extension<HttpState>) -> Json<HealthResponse> {
    let credential = state.services.credential_status();
    let credential_expires_in = match credential {
        CredentialStatus::Valid { remaining } => Some(remaining.as_secs()),
        CredentialStatus::Absent | CredentialStatus::Refreshing => None,
    };
    Json(HealthResponse {
        status: "ok".into(),
        credential: credential.label().into(),
        credential_expires_in,
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/themes",
    responses(
        (status = 200, description = "Built-in themes.", body = [ThemeDto]),
        (status = 401, description = "Unauthorized.", body = crate::presentation::http::error::ErrorResponse)
    ),
    tag = "System"
)]
pub async fn list_themes(
    Extension(state): Extension<HttpState>,
    _auth: Authorized,
) -> Json<Vec<ThemeDto>> {
    Json(state.services.themes())
}
