//! Catalog service abstraction
//!
//! The streaming-service API is an external collaborator: track search for
//! visitors and the resolver, plus playlist creation and bulk-add for the
//! import orchestrator. `SpotifyCatalog` is the production implementation.

pub mod spotify;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use serde::Serialize;
use songreq_common::Error;
use thiserror::Error;

pub use spotify::SpotifyCatalog;

/// Catalog client errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Catalog rejected the credential")]
    Unauthorized,

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Catalog client not configured: {0}")]
    NotConfigured(String),
}

impl From<CatalogError> for Error {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Unauthorized => Error::Unauthenticated,
            other => Error::CatalogUnavailable(other.to_string()),
        }
    }
}

/// Which token a catalog call runs under
#[derive(Debug, Clone, Copy)]
pub enum CatalogAuth<'a> {
    /// Application token (visitor autocomplete, no organizer login needed)
    App,
    /// The organizer's access token
    User(&'a str),
}

/// Track search query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Free text typed into the autocomplete box
    Text(String),
    /// Field-qualified artist + title lookup
    Structured { artist: String, title: String },
}

impl SearchQuery {
    pub fn structured(artist: impl Into<String>, title: impl Into<String>) -> Self {
        SearchQuery::Structured {
            artist: artist.into(),
            title: title.into(),
        }
    }

    /// Render using the catalog's field filter syntax
    pub fn to_query_string(&self) -> String {
        match self {
            SearchQuery::Text(text) => text.trim().to_string(),
            SearchQuery::Structured { artist, title } => {
                format!("artist:{} track:{}", artist.trim(), title.trim())
            }
        }
    }
}

/// One search hit, as returned to the autocomplete widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackCandidate {
    pub name: String,
    /// Artist names joined with ", "
    pub artist: String,
    pub identifier: String,
    pub artwork_url: Option<String>,
}

/// Settings for the playlist an import creates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistOptions {
    pub name: String,
    pub description: String,
    pub public: bool,
}

impl From<&songreq_common::config::PlaylistConfig> for PlaylistOptions {
    fn from(config: &songreq_common::config::PlaylistConfig) -> Self {
        Self {
            name: config.name.clone(),
            description: config.description.clone(),
            public: config.public,
        }
    }
}

/// Playlist created on the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistRef {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
}

/// Catalog operations needed by search, resolution and import
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Search tracks, best match first, at most `limit` results
    async fn search(
        &self,
        auth: CatalogAuth<'_>,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<Vec<TrackCandidate>, CatalogError>;

    /// Create a playlist owned by the token's user
    async fn create_playlist(
        &self,
        token: &str,
        options: &PlaylistOptions,
    ) -> Result<PlaylistRef, CatalogError>;

    /// Append tracks in a single call
    ///
    /// Callers are responsible for respecting the per-call item cap.
    async fn add_tracks(
        &self,
        token: &str,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), CatalogError>;
}
