//! Track resolver
//!
//! Maps a song request to a catalog track identifier. Autocomplete
//! submissions already carry the identifier and are trusted as-is; free-text
//! submissions get one structured search where the first hit wins.
//!
//! Single attempt, no retries and no fuzzy re-querying. Catalog errors are
//! returned to the caller, which decides whether they are fatal.

use serde::Serialize;
use songreq_common::SongRequest;
use std::sync::Arc;
use tracing::debug;

use crate::catalog::{CatalogAuth, CatalogError, CatalogService, SearchQuery};

/// How a track identifier was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// Identifier supplied with the submission
    Direct,
    /// First result of a catalog search
    Search,
}

/// Catalog track confirmed for a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTrack {
    pub track_id: String,
    pub source: ResolutionSource,
    /// Catalog track name when found by search
    pub matched_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedTrack),
    Unresolved,
}

/// Best-effort request → track resolution
pub struct TrackResolver {
    catalog: Arc<dyn CatalogService>,
}

impl TrackResolver {
    pub fn new(catalog: Arc<dyn CatalogService>) -> Self {
        Self { catalog }
    }

    /// Resolve `request` using the organizer's `token` for any search
    pub async fn resolve(
        &self,
        request: &SongRequest,
        token: &str,
    ) -> Result<Resolution, CatalogError> {
        if let Some(id) = request
            .catalog_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
        {
            debug!(request_id = request.id, track_id = %id, "Using submitted catalog id");
            return Ok(Resolution::Resolved(ResolvedTrack {
                track_id: id.to_string(),
                source: ResolutionSource::Direct,
                matched_name: None,
            }));
        }

        let query = SearchQuery::structured(&request.artist, &request.title);
        let hits = self
            .catalog
            .search(CatalogAuth::User(token), &query, 1)
            .await?;

        Ok(match hits.into_iter().next() {
            Some(track) => Resolution::Resolved(ResolvedTrack {
                track_id: track.identifier,
                source: ResolutionSource::Search,
                matched_name: Some(track.name),
            }),
            None => Resolution::Unresolved,
        })
    }
}
