//! Host pages that embed the vendor widget.

use axum::{
    extract::{Query, State},
    response::Html,
};
use kingo_sharefox::embed::escape_attr;
use kingo_sharefox::{vendor_search_url, EmbedContainer, EmbedLoader, EmbedPath, EmbedScript};
use serde::Deserialize;

use crate::api::AppState;

/// Items shown by the landing page's popular-products widget.
const POPULAR_VOLUME: u32 = 8;

#[derive(Debug, Deserialize)]
pub(crate) struct SearchPageQuery {
    pub q: Option<String>,
}

pub(crate) async fn landing(State(state): State<AppState>) -> Html<String> {
    let shop = state.client.shop();
    let loader = EmbedLoader::new(EmbedScript::for_shop(shop));
    let popular = EmbedContainer::new(shop, EmbedPath::ProductsPopular).with_volume(POPULAR_VOLUME);

    Html(render_page(
        "Kingo Rides",
        &[popular.to_html()],
        loader.ensure_loaded(),
    ))
}

pub(crate) async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchPageQuery>,
) -> Html<String> {
    let shop = state.client.shop();
    let term = query.q.as_deref().map(str::trim).unwrap_or_default();

    if term.is_empty() {
        let loader = EmbedLoader::new(EmbedScript::for_shop(shop));
        let container = EmbedContainer::new(shop, EmbedPath::Search);
        return Html(render_page(
            "Search",
            &[container.to_html()],
            loader.ensure_loaded(),
        ));
    }

    tracing::debug!(term, "rendering vendor search frame");
    let frame = format!(
        r#"<iframe class="sharefox-search" src="{}" title="Search results" loading="lazy"></iframe>"#,
        escape_attr(&vendor_search_url(shop, term))
    );
    let heading = format!("<h1>Results for &quot;{}&quot;</h1>", escape_attr(term));
    Html(render_page("Search", &[heading, frame], None))
}

fn render_page(title: &str, body: &[String], script: Option<String>) -> String {
    let mut html = String::from("<!doctype html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_attr(title)));
    if let Some(script) = script {
        html.push_str(&script);
        html.push('\n');
    }
    html.push_str("</head>\n<body>\n");
    for block in body {
        html.push_str(block);
        html.push('\n');
    }
    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_includes_script_once_in_head() {
        let html = render_page("T", &["<p>x</p>".to_string()], Some("<script></script>".into()));
        assert_eq!(html.matches("<script").count(), 1);
        assert!(html.find("<script").unwrap() < html.find("</head>").unwrap());
        assert!(html.contains("<p>x</p>"));
    }

    #[test]
    fn title_is_escaped() {
        let html = render_page("<b>", &[], None);
        assert!(html.contains("<title>&lt;b&gt;</title>"));
    }
}
