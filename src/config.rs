// src/config.rs
use std::{env, path::PathBuf, str::FromStr, time::Duration};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    database_url: String,
    listen_addr: String,
    wx_app_id: String,
    wx_app_secret: String,
    wx_api_base: String,
    wx_image_host: String,
    http_timeout: Duration,
    token_refresh_margin: Duration,
    media_upload_concurrency: usize,
    upload_dir: PathBuf,
    public_base_url: String,
    auth_token: Option<String>,
    draft_author: Option<String>,
    allowed_origins: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn default_database_url() -> String {
    "sqlite://draft_relay.db".into()
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".into()
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parsed<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match optional(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("{key} has an invalid value `{raw}`"))),
        None => Ok(default),
    }
}

impl AppConfig {
    /// Build configuration from environment variables. Only the platform
    /// app credentials are required.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let listen_addr = optional("LISTEN_ADDR").unwrap_or_else(default_listen_addr);

        let http_timeout_secs: u64 = parsed("HTTP_TIMEOUT_SECONDS", 15)?;
        if http_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "HTTP_TIMEOUT_SECONDS must be positive".into(),
            ));
        }
        let media_upload_concurrency: usize = parsed("MEDIA_UPLOAD_CONCURRENCY", 4)?;
        if media_upload_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "MEDIA_UPLOAD_CONCURRENCY must be at least 1".into(),
            ));
        }

        let public_base_url = optional("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://{listen_addr}"))
            .trim_end_matches('/')
            .to_string();
        url::Url::parse(&public_base_url)
            .map_err(|err| ConfigError::Invalid(format!("PUBLIC_BASE_URL: {err}")))?;

        let allowed_origins = optional("ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url: optional("DATABASE_URL").unwrap_or_else(default_database_url),
            listen_addr,
            wx_app_id: required("WX_APPID")?,
            wx_app_secret: required("WX_APPSECRET")?,
            wx_api_base: optional("WX_API_BASE")
                .unwrap_or_else(|| crate::infrastructure::platform::DEFAULT_API_BASE.into()),
            wx_image_host: optional("WX_IMAGE_HOST")
                .unwrap_or_else(|| crate::application::media::DEFAULT_IMAGE_HOST.into()),
            http_timeout: Duration::from_secs(http_timeout_secs),
            token_refresh_margin: Duration::from_secs(parsed(
                "TOKEN_REFRESH_MARGIN_SECONDS",
                300,
            )?),
            media_upload_concurrency,
            upload_dir: optional("UPLOAD_DIR").map_or_else(|| PathBuf::from("uploads"), PathBuf::from),
            public_base_url,
            auth_token: optional("AUTH_TOKEN"),
            draft_author: optional("DRAFT_AUTHOR"),
            allowed_origins,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn listen_addr(&self) -> &str {
        &self.listen_addr
    }

    pub fn wx_app_id(&self) -> &str {
        &self.wx_app_id
    }

    pub fn wx_app_secret(&self) -> &str {
        &self.wx_app_secret
    }

    pub fn wx_api_base(&self) -> &str {
        &self.wx_api_base
    }

    pub fn wx_image_host(&self) -> &str {
        &self.wx_image_host
    }

    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }

    pub fn token_refresh_margin(&self) -> Duration {
        self.token_refresh_margin
    }

    pub fn media_upload_concurrency(&self) -> usize {
        self.media_upload_concurrency
    }

    pub fn upload_dir(&self) -> &PathBuf {
        &self.upload_dir
    }

    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    /// Bearer token guarding `/api`; `None` leaves the API open.
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn draft_author(&self) -> Option<&str> {
        self.draft_author.as_deref()
    }

    /// Empty means any origin.
    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }
}
