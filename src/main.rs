use draft_relay::application::{
    ports::{
        platform::{CredentialIssuer, PlatformPublisher},
        time::Clock,
    },
    publish::PublishSettings,
    services::{ApplicationServices, ServiceSettings},
};
use draft_relay::config::AppConfig;
use draft_relay::domain::{
    article::{ArticleReadRepository, ArticleWriteRepository},
    media::MediaStore,
};
use draft_relay::infrastructure::{
    database,
    media::FsMediaStore,
    platform::{WeChatClient, WeChatSettings},
    repositories::{SqliteArticleReadRepository, SqliteArticleWriteRepository},
    time::SystemClock,
};
use draft_relay::presentation::http::{
    routes::build_router,
    state::{AuthTokenDigest, HttpState},
};
use anyhow::Result;
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    if let Err(err) = bootstrap().await {
        tracing::error!(error = %err, "fatal error");
        eprintln!("fatal error: {err:#}");
        std::process::exit(1);
    }
}

async fn bootstrap() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;

    let pool = database::init_pool(config.database_url()).await?;
    database::run_migrations(&pool).await?;
    let pool = Arc::new(pool);

    let article_write_repo: Arc<dyn ArticleWriteRepository> =
        Arc::new(SqliteArticleWriteRepository::new(Arc::clone(&pool)));
    let article_read_repo: Arc<dyn ArticleReadRepository> =
        Arc::new(SqliteArticleReadRepository::new(Arc::clone(&pool)));
    let media_store: Arc<dyn MediaStore> = Arc::new(FsMediaStore::open(config.upload_dir()).await?);

    let wechat = Arc::new(WeChatClient::new(WeChatSettings {
        api_base: config.wx_api_base().to_string(),
        app_id: config.wx_app_id().to_string(),
        app_secret: config.wx_app_secret().to_string(),
        timeout: config.http_timeout(),
    })?);
    let credential_issuer: Arc<dyn CredentialIssuer> = wechat.clone();
    let platform: Arc<dyn PlatformPublisher> = wechat;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let settings = ServiceSettings {
        public_base_url: config.public_base_url().to_string(),
        image_host: config.wx_image_host().to_string(),
        refresh_margin: config.token_refresh_margin(),
        publish: PublishSettings {
            upload_concurrency: config.media_upload_concurrency(),
            author: config.draft_author().map(str::to_string),
        },
    };

    let services = Arc::new(ApplicationServices::new(
        article_write_repo,
        article_read_repo,
        media_store,
        credential_issuer,
        platform,
        clock,
        settings,
    ));

    if config.auth_token().is_none() {
        tracing::warn!("AUTH_TOKEN is not set; the API accepts unauthenticated requests");
    }
    let state = HttpState {
        services,
        auth: config.auth_token().map(AuthTokenDigest::new),
    };

    let app = build_router(state, config.allowed_origins());

    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    let address: SocketAddr = listener.local_addr()?;
    tracing::info!(public_base_url = config.public_base_url(), "listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .ok()
        .unwrap_or_else(|| "info,tower_http=info,sqlx=warn".to_string());

    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(env_filter))
        .with(tracing_subscriber::fmt::layer());

    if subscriber.try_init().is_err() {
        tracing::warn!("tracing subscriber already initialised");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
