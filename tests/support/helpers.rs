// tests/support/helpers.rs
use super::mocks::{FakePlatform, FixedClock, InMemoryArticles, MemoryMediaStore, ScriptedIssuer};
use axum::{
    body::{self, Body},
    http::{Request, StatusCode, header},
    response::Response,
};
use draft_relay::{
    application::{
        publish::PublishSettings,
        services::{ApplicationServices, ServiceSettings},
    },
    domain::article::{Article, ArticleBody, ArticleId, ArticleTitle, ThemeId},
    presentation::http::{
        routes::build_router,
        state::{AuthTokenDigest, HttpState},
    },
};
use serde_json::Value;
use std::sync::Arc;

pub const PUBLIC_BASE: &str = "http://relay.test";
pub const API_TOKEN: &str = "test-api-token";

/// Services wired against in-memory fakes, with handles on every fake.
pub struct TestApp {
    pub services: Arc<ApplicationServices>,
    pub articles: Arc<InMemoryArticles>,
    pub media: Arc<MemoryMediaStore>,
    pub issuer: Arc<ScriptedIssuer>,
    pub platform: Arc<FakePlatform>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_issuer(ScriptedIssuer::default(), PublishSettings::default())
    }

    pub fn with_issuer(issuer: ScriptedIssuer, publish: PublishSettings) -> Self {
        let articles = Arc::new(InMemoryArticles::default());
        let media = Arc::new(MemoryMediaStore::default());
        let issuer = Arc::new(issuer);
        let platform = Arc::new(FakePlatform::default());

        let settings = ServiceSettings {
            public_base_url: PUBLIC_BASE.into(),
            publish,
            ..ServiceSettings::default()
        };
        let services = Arc::new(ApplicationServices::new(
            articles.clone(),
            articles.clone(),
            media.clone(),
            issuer.clone(),
            platform.clone(),
            Arc::new(FixedClock),
            settings,
        ));

        Self {
            services,
            articles,
            media,
            issuer,
            platform,
        }
    }

    /// Markdown image pointing at a staged image.
    pub fn image_markdown(image: &impl std::fmt::Display) -> String {
        format!("![figure]({PUBLIC_BASE}/images/{image})")
    }

    pub fn insert_article(&self, title: &str, body: &str, theme: &str) -> Article {
        let now = super::mocks::fixed_now();
        let article = Article {
            id: ArticleId::generate(),
            title: ArticleTitle::new(title).unwrap(),
            body: ArticleBody::new(body),
            theme: ThemeId::new(theme),
            cover_image: None,
            created_at: now,
            updated_at: now,
            published_at: None,
            draft_id: None,
        };
        self.articles.put(article.clone());
        article
    }

    pub fn router(&self, auth: Option<&str>) -> axum::Router {
        let state = HttpState {
            services: Arc::clone(&self.services),
            auth: auth.map(AuthTokenDigest::new),
        };
        build_router(state, &[])
    }
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {API_TOKEN}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {API_TOKEN}"))
        .body(Body::empty())
        .unwrap()
}

pub async fn read_body(resp: Response) -> (StatusCode, Vec<u8>) {
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), 4 * 1024 * 1024)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

pub async fn read_json(resp: Response) -> (StatusCode, Value) {
    let (status, bytes) = read_body(resp).await;
    let value = serde_json::from_slice(&bytes).unwrap_or_else(|err| {
        panic!(
            "expected json ({err}), got: {}",
            String::from_utf8_lossy(&bytes)
        )
    });
    (status, value)
}

/// Asserts an `ErrorResponse` body with the given status and reason.
pub async fn assert_error_response(resp: Response, status: StatusCode, error: &str) -> Value {
    let (actual, body) = read_json(resp).await;
    assert_eq!(actual, status, "unexpected status, body: {body}");
    assert_eq!(body["error"], error, "unexpected error body: {body}");
    assert!(body["message"].is_string());
    body
}
