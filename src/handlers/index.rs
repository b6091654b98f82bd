use axum::http::StatusCode;
use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Serves the chat front end.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}
