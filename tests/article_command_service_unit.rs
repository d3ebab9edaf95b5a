// tests/article_command_service_unit.rs
use draft_relay::application::{
    commands::articles::{CreateArticleCommand, UpdateArticleCommand},
    commands::images::StageImageCommand,
    error::ApplicationError,
    queries::articles::{GetArticleByIdQuery, PreviewArticleQuery},
};
use draft_relay::domain::errors::DomainError;

mod support;
use support::{PUBLIC_BASE, TestApp, fixed_now};

#[tokio::test]
async fn create_defaults_theme_and_checks_cover() {
    let app = TestApp::new();
    let commands = &app.services.article_commands;

    let command = CreateArticleCommand::builder()
        .title("Plain")
        .body("text")
        .build()
        .unwrap();
    let created = commands.create_article(command).await.unwrap();
    assert_eq!(created.theme, "default");
    assert_eq!(created.created_at, fixed_now());
    assert!(created.cover_image.is_none());

    let missing_cover = CreateArticleCommand::builder()
        .title("Cover")
        .cover_image("cafe01.png")
        .build()
        .unwrap();
    let err = commands.create_article(missing_cover).await.unwrap_err();
    assert!(matches!(err, ApplicationError::Validation(_)), "{err:?}");

    let malformed_cover = CreateArticleCommand::builder()
        .title("Cover")
        .cover_image("../etc/passwd")
        .build()
        .unwrap();
    let err = commands.create_article(malformed_cover).await.unwrap_err();
    assert!(matches!(err, ApplicationError::Domain(DomainError::Validation(_))));

    assert!(CreateArticleCommand::builder().body("no title").build().is_err());
}

#[tokio::test]
async fn update_sets_and_clears_the_cover() {
    let app = TestApp::new();
    let cover = app.media.put_png(1_000);
    let article = app.insert_article("Title", "body", "default");

    let updated = app
        .services
        .article_commands
        .update_article(UpdateArticleCommand {
            id: article.id.to_string(),
            title: None,
            body: None,
            theme: Some("lapis".into()),
            cover_image: Some(Some(cover.to_string())),
        })
        .await
        .unwrap();
    assert_eq!(updated.theme, "lapis");
    assert_eq!(updated.cover_image.as_deref(), Some(cover.as_str()));

    let cleared = app
        .services
        .article_commands
        .update_article(UpdateArticleCommand {
            id: article.id.to_string(),
            title: None,
            body: None,
            theme: None,
            cover_image: Some(None),
        })
        .await
        .unwrap();
    assert!(cleared.cover_image.is_none());
    assert_eq!(cleared.theme, "lapis");
}

#[tokio::test]
async fn update_of_unknown_article_is_not_found() {
    let app = TestApp::new();
    let err = app
        .services
        .article_commands
        .update_article(UpdateArticleCommand {
            id: "unknown".into(),
            title: Some("t".into()),
            body: None,
            theme: None,
            cover_image: None,
        })
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            ApplicationError::NotFound(_) | ApplicationError::Domain(DomainError::NotFound(_))
        ),
        "{err:?}"
    );
}

#[tokio::test]
async fn staged_image_renders_with_its_local_url_in_preview() {
    let app = TestApp::new();
    let staged = app
        .services
        .image_commands
        .stage_image(StageImageCommand {
            data: format!(
                "data:image/png;base64,{}",
                "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg=="
            ),
            mime_type: None,
        })
        .await
        .unwrap();
    assert_eq!(staged.mime_type, "image/png");
    assert!(staged.url.starts_with(&format!("{PUBLIC_BASE}/images/")));

    let article = app.insert_article("Pic", &staged.markdown, "orangeheart");
    let preview = app
        .services
        .article_queries
        .preview_article(PreviewArticleQuery {
            id: article.id.to_string(),
        })
        .await
        .unwrap();
    assert_eq!(preview.theme, "orangeheart");
    assert!(preview.markup.contains(&staged.url));

    let dto = app
        .services
        .article_queries
        .get_article_by_id(GetArticleByIdQuery {
            id: article.id.to_string(),
        })
        .await
        .unwrap();
    assert_eq!(dto.title, "Pic");
}
