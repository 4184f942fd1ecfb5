//! Catalog search for the autocomplete widget

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{
    catalog::{CatalogAuth, SearchQuery, TrackCandidate},
    error::ApiResult,
    AppState,
};

/// Query parameters for track search
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

pub fn search_routes() -> Router<AppState> {
    Router::new().route("/api/search", get(search_tracks))
}

/// GET /api/search?q=...
///
/// Up to `search_limit` candidates, best match first. A blank query returns
/// an empty list without contacting the catalog.
pub async fn search_tracks(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<TrackCandidate>>> {
    let q = params.q.trim();
    if q.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let mut hits = state
        .catalog
        .search(
            CatalogAuth::App,
            &SearchQuery::Text(q.to_string()),
            state.limits.search_limit,
        )
        .await?;
    hits.truncate(state.limits.search_limit);

    tracing::debug!(query = %q, results = hits.len(), "Autocomplete search");
    Ok(Json(hits))
}
