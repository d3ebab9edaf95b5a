// src/presentation/http/controllers/preview.rs
use crate::application::queries::articles::{ArticlePreview, PreviewArticleQuery};
use crate::presentation::http::error::{HttpResult, IntoHttpResult};
use crate::presentation::http::state::HttpState;
use axum::{Extension, extract::Path, response::Html};

#[utoipa::path(
    get,
    path = "/preview/{id}",
    params(("id" = String, Path, description = "Article identifier")),
    responses(
        (status = 200, description = "Rendered article as it will look on the platform.", body = String, content_type = "text/html"),
        (status = 404, description = "Article not found.", body = crate::presentation::http::error::ErrorResponse)
    ),
    security([]),
    tag = "Articles"
)]
pub async fn preview_article(
    Extension(state): Extension<HttpState>,
    Path(id): Path<String>,
) -> HttpResult<Html<String>> {
    state
        .services
        .article_queries
        .preview_article(PreviewArticleQuery { id })
        .await
        .into_http()
        .map(|preview| Html(page(&preview)))
}

/// Wraps the rendered markup in a phone-width page. The markup carries its
/// own inline styles, so the page adds nothing but layout.
fn page(preview: &ArticlePreview) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"zh-CN\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <meta name=\"theme\" content=\"{theme}\">\n<title>{title}</title>\n</head>\n\
         <body style=\"margin:0;background:#f5f5f5;\">\n\
         <main style=\"max-width:677px;margin:0 auto;padding:20px 16px;background:#fff;\">\n\
         <h1 style=\"font-size:22px;line-height:1.4;margin:0 0 16px;\">{title}</h1>\n\
         {markup}\n</main>\n</body>\n</html>\n",
        theme = html_escape::encode_double_quoted_attribute(&preview.theme),
        title = html_escape::encode_text(&preview.title),
        markup = preview.markup,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_escaped() {
        let html = page(&ArticlePreview {
            title: "<b>x</b>".into(),
            theme: "default".into(),
            markup: "<section>body</section>".into(),
        });
        assert!(html.contains("&lt;b&gt;x&lt;/b&gt;"));
        assert!(html.contains("<section>body</section>"));
    }
}
