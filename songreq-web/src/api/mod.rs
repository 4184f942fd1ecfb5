//! HTTP API handlers for songreq-web

pub mod admin;
pub mod auth;
pub mod buildinfo;
pub mod health;
pub mod import;
pub mod requests;
pub mod search;
pub mod ui;

pub use admin::admin_routes;
pub use auth::auth_routes;
pub use health::health_routes;
pub use import::import_routes;
pub use requests::request_routes;
pub use search::search_routes;
pub use ui::ui_routes;

use axum::response::Redirect;

/// Severity of the one-shot notice shown after a redirect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    fn as_str(self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

/// Redirect to `path` carrying a notice in the query string
///
/// The pages read `status` and `message` and render them as a transient
/// banner.
pub fn redirect_with_notice(path: &str, level: NoticeLevel, message: &str) -> Redirect {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("status", level.as_str())
        .append_pair("message", message)
        .finish();
    Redirect::to(&format!("{}?{}", path, query))
}
