//! UI serving routes
//!
//! Static pages; all dynamic content is fetched from the JSON API by
//! `app.js`.

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use crate::AppState;

const INDEX_HTML: &str = include_str!("../../ui/index.html");
const ADMIN_HTML: &str = include_str!("../../ui/admin.html");
const APP_JS: &str = include_str!("../../ui/app.js");

pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(serve_index))
        .route("/admin", get(serve_admin))
        .route("/static/app.js", get(serve_app_js))
}

/// GET /
///
/// Visitor request form with autocomplete and recent requests
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /admin
///
/// Organizer view: full request list, login and import
pub async fn serve_admin() -> Html<&'static str> {
    Html(ADMIN_HTML)
}

/// GET /static/app.js
pub async fn serve_app_js() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/javascript")],
        APP_JS,
    )
        .into_response()
}
