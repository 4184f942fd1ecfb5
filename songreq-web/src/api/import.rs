//! Import action
//!
//! `POST /import` is the organizer page's button: it redirects to `/login`
//! without a usable credential and otherwise back to `/admin` with a result
//! notice. `POST /api/import` returns the full summary as JSON.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::post,
    Json, Router,
};
use songreq_common::Error;
use tracing::{info, warn};

use super::{redirect_with_notice, NoticeLevel};
use crate::credential::{Credential, OAuthToken};
use crate::error::ApiResult;
use crate::orchestrator::ImportSummary;
use crate::AppState;

pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route("/import", post(import_form))
        .route("/api/import", post(import_json))
}

/// Active credential for the request's session, refreshing it once if needed
async fn session_credential(state: &AppState, headers: &HeaderMap) -> Option<OAuthToken> {
    let (session, token) = state.sessions.from_headers(headers).await?;
    if token.is_active() {
        return Some(token);
    }
    if !token.can_refresh() {
        info!("Organizer token expired without refresh token");
        return None;
    }

    match state.auth_flow.refresh(&token).await {
        Ok(fresh) => {
            state.sessions.replace(session, fresh.clone()).await;
            Some(fresh)
        }
        Err(e) => {
            warn!(error = %e, "Token refresh failed");
            state.sessions.end(session).await;
            None
        }
    }
}

async fn run_import(state: &AppState, headers: &HeaderMap) -> Result<ImportSummary, Error> {
    let credential = session_credential(state, headers).await;
    state
        .importer
        .run(
            &state.ledger,
            credential.as_ref().map(|c| c as &dyn Credential),
        )
        .await
}

/// Notice text for a finished import
pub fn summary_message(summary: &ImportSummary) -> (NoticeLevel, String) {
    let name = &summary.playlist.name;
    if summary.tracks_added == 0 {
        return (
            NoticeLevel::Warning,
            format!("No tracks could be added to playlist '{}'", name),
        );
    }

    let mut message = format!(
        "Added {} track{} to playlist '{}'",
        summary.tracks_added,
        if summary.tracks_added == 1 { "" } else { "s" },
        name
    );
    if summary.not_found > 0 {
        message.push_str(&format!(" ({} not found)", summary.not_found));
    }
    (NoticeLevel::Success, message)
}

/// POST /import
pub async fn import_form(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match run_import(&state, &headers).await {
        Ok(summary) => {
            let (level, message) = summary_message(&summary);
            redirect_with_notice("/admin", level, &message).into_response()
        }
        Err(Error::Unauthenticated) => Redirect::to("/login").into_response(),
        Err(Error::ImportInProgress) => redirect_with_notice(
            "/admin",
            NoticeLevel::Warning,
            "An import is already running",
        )
        .into_response(),
        Err(e) => {
            warn!(error = %e, "Import failed");
            redirect_with_notice("/admin", NoticeLevel::Error, &format!("Import failed: {}", e))
                .into_response()
        }
    }
}

/// POST /api/import
pub async fn import_json(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<ImportSummary>> {
    Ok(Json(run_import(&state, &headers).await?))
}
