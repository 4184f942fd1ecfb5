//! Organizer listing

use axum::{extract::State, http::HeaderMap, routing::get, Json, Router};
use serde::Serialize;
use songreq_common::SongRequest;

use crate::AppState;

/// GET /api/admin/requests response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRequestsResponse {
    /// Every request, oldest first
    pub requests: Vec<SongRequest>,
    /// A credential is held for this session
    pub is_logged_in: bool,
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/api/admin/requests", get(list_all))
}

/// GET /api/admin/requests
pub async fn list_all(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<AdminRequestsResponse> {
    let is_logged_in = state.sessions.from_headers(&headers).await.is_some();
    let requests = state.ledger.read().await.list_all();
    Json(AdminRequestsResponse {
        requests,
        is_logged_in,
    })
}
