//! Song request submission and listing
//!
//! `POST /` is the HTML form endpoint and answers with a redirect;
//! `POST /api/requests` is the JSON variant used by scripted clients.

use axum::{
    extract::State,
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
    Form, Json, Router,
};
use songreq_common::{Error, SongRequest};
use tracing::info;

use super::{redirect_with_notice, NoticeLevel};
use crate::{error::ApiResult, ledger::NewRequest, AppState};

pub fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_form))
        .route("/api/requests", post(submit_json))
        .route("/api/requests/recent", get(list_recent))
}

async fn record(state: &AppState, request: NewRequest) -> Result<SongRequest, Error> {
    let entry = state.ledger.write().await.submit(request)?;
    info!(
        id = entry.id,
        artist = %entry.artist,
        title = %entry.title,
        autocomplete = entry.catalog_id.is_some(),
        "Song request received"
    );
    Ok(entry)
}

/// POST /
///
/// Form submission. Redirects back to the visitor page with a notice.
pub async fn submit_form(
    State(state): State<AppState>,
    Form(request): Form<NewRequest>,
) -> ApiResult<Redirect> {
    match record(&state, request).await {
        Ok(_) => Ok(redirect_with_notice(
            "/",
            NoticeLevel::Success,
            "Request received!",
        )),
        Err(Error::Validation(message)) => {
            Ok(redirect_with_notice("/", NoticeLevel::Error, &message))
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /api/requests
///
/// JSON submission. Returns 201 with the stored entry.
pub async fn submit_json(
    State(state): State<AppState>,
    Json(request): Json<NewRequest>,
) -> ApiResult<(StatusCode, Json<SongRequest>)> {
    let entry = record(&state, request).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/requests/recent
///
/// Most recent requests, newest first.
pub async fn list_recent(State(state): State<AppState>) -> Json<Vec<SongRequest>> {
    let recent = state.ledger.read().await.list_recent(state.limits.recent_limit);
    Json(recent)
}
