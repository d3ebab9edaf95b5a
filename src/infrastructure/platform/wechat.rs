// src/infrastructure/platform/wechat.rs
//! reqwest client for the WeChat Official Account API.
//!
//! Every endpoint answers HTTP 200 and reports failures through an
//! `{errcode, errmsg}` envelope, so responses are decoded in two passes.

use crate::{
    application::ports::platform::{
        AccessToken, CredentialIssuer, DraftSubmission, IssuedCredential, MediaId, PlatformError,
        PlatformPublisher, PlatformUrl,
    },
    domain::{article::DraftId, media::StagedImage},
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://api.weixin.qq.com";

#[derive(Debug, Clone)]
pub struct WeChatSettings {
    pub api_base: String,
    pub app_id: String,
    pub app_secret: String,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct WeChatClient {
    http: reqwest::Client,
    api_base: String,
    app_id: String,
    app_secret: String,
}

impl WeChatClient {
    pub fn new(settings: WeChatSettings) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.timeout)
            .build()
            .map_err(|err| PlatformError::InvalidResponse(format!("http client: {err}")))?;
        Ok(Self {
            http,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            app_id: settings.app_id,
            app_secret: settings.app_secret,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, PlatformError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(PlatformError::InvalidResponse(format!("HTTP {status}")));
        }
        decode(&body)
    }

    async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        image: &StagedImage,
    ) -> Result<T, PlatformError> {
        let part = Part::bytes(image.bytes.to_vec())
            .file_name(image.reference.to_string())
            .mime_str(image.format.mime_type())
            .map_err(|err| PlatformError::InvalidResponse(err.to_string()))?;
        let form = Form::new().part("media", part);
        debug!(image = %image.reference, size = image.bytes.len(), path, "uploading image");
        self.send(self.http.post(self.endpoint(path)).query(query).multipart(form))
            .await
    }
}

/// Request URLs carry the app secret or the access token in their query, so
/// the URL is stripped before the error is kept anywhere.
fn transport_error(err: reqwest::Error) -> PlatformError {
    let err = err.without_url();
    if err.is_timeout() || err.is_connect() {
        PlatformError::Timeout(err.to_string())
    } else {
        PlatformError::InvalidResponse(err.to_string())
    }
}

/// Decodes a platform response, turning a non-zero `errcode` into
/// [`PlatformError::Api`].
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, PlatformError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|err| PlatformError::InvalidResponse(format!("not json: {err}")))?;
    let code = value.get("errcode").and_then(Value::as_i64).unwrap_or(0);
    if code != 0 {
        let message = value
            .get("errmsg")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Err(PlatformError::api(code, message));
    }
    serde_json::from_value(value).map_err(|err| PlatformError::InvalidResponse(err.to_string()))
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Deserialize)]
struct UploadImageResponse {
    url: String,
}

#[derive(Deserialize)]
struct AddMaterialResponse {
    media_id: String,
}

#[derive(Deserialize)]
struct DraftResponse {
    media_id: String,
}

#[derive(Serialize)]
struct DraftRequest<'a> {
    articles: [DraftArticle<'a>; 1],
}

#[derive(Serialize)]
struct DraftArticle<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<&'a str>,
    digest: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumb_media_id: Option<&'a str>,
    need_open_comment: u8,
    only_fans_can_comment: u8,
}

impl<'a> DraftRequest<'a> {
    fn new(draft: &'a DraftSubmission) -> Self {
        Self {
            articles: [DraftArticle {
                title: &draft.title,
                author: draft.author.as_deref(),
                digest: &draft.digest,
                content: &draft.content,
                thumb_media_id: draft.cover.as_ref().map(MediaId::as_str),
                need_open_comment: 0,
                only_fans_can_comment: 0,
            }],
        }
    }
}

#[async_trait]
impl CredentialIssuer for WeChatClient {
    async fn issue(&self) -> Result<IssuedCredential, PlatformError> {
        let request = self.http.get(self.endpoint("/cgi-bin/token")).query(&[
            ("grant_type", "client_credential"),
            ("appid", self.app_id.as_str()),
            ("secret", self.app_secret.as_str()),
        ]);
        let response: TokenResponse = self.send(request).await?;
        let seconds = u64::try_from(response.expires_in).unwrap_or(0);
        Ok(IssuedCredential {
            token: AccessToken::new(response.access_token),
            expires_in: Duration::from_secs(seconds),
        })
    }
}

#[async_trait]
impl PlatformPublisher for WeChatClient {
    async fn upload_inline_image(
        &self,
        token: &AccessToken,
        image: &StagedImage,
    ) -> Result<PlatformUrl, PlatformError> {
        let response: UploadImageResponse = self
            .upload(
                "/cgi-bin/media/uploadimg",
                &[("access_token", token.expose())],
                image,
            )
            .await?;
        Ok(PlatformUrl::new(response.url))
    }

    async fn upload_cover_image(
        &self,
        token: &AccessToken,
        image: &StagedImage,
    ) -> Result<MediaId, PlatformError> {
        let response: AddMaterialResponse = self
            .upload(
                "/cgi-bin/material/add_material",
                &[("access_token", token.expose()), ("type", "image")],
                image,
            )
            .await?;
        Ok(MediaId::new(response.media_id))
    }

    async fn create_draft(
        &self,
        token: &AccessToken,
        draft: &DraftSubmission,
    ) -> Result<DraftId, PlatformError> {
        let request = self
            .http
            .post(self.endpoint("/cgi-bin/draft/add"))
            .query(&[("access_token", token.expose())])
            .json(&DraftRequest::new(draft));
        let response: DraftResponse = self.send(request).await?;
        DraftId::new(response.media_id)
            .map_err(|err| PlatformError::InvalidResponse(err.to_string()))
    }
}
