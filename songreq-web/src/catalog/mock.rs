//! Recording catalog double for unit tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{
    CatalogAuth, CatalogError, CatalogService, PlaylistOptions, PlaylistRef, SearchQuery,
    TrackCandidate,
};

#[derive(Default)]
pub(crate) struct MockCatalog {
    /// Canned results keyed by rendered query string; missing keys return no hits
    pub results: HashMap<String, Vec<TrackCandidate>>,
    /// Rendered queries that fail with a network error
    pub failing_queries: Vec<String>,
    pub fail_create: bool,
    pub fail_add: bool,
    pub searches: Mutex<Vec<String>>,
    pub created: Mutex<Vec<PlaylistOptions>>,
    pub add_calls: Mutex<Vec<Vec<String>>>,
}

impl MockCatalog {
    pub fn with_hit(mut self, artist: &str, title: &str, id: &str) -> Self {
        let query = SearchQuery::structured(artist, title).to_query_string();
        self.results.insert(
            query,
            vec![TrackCandidate {
                name: title.to_string(),
                artist: artist.to_string(),
                identifier: id.to_string(),
                artwork_url: None,
            }],
        );
        self
    }

    pub fn search_count(&self) -> usize {
        self.searches.lock().unwrap().len()
    }

    pub fn added(&self) -> Vec<Vec<String>> {
        self.add_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogService for MockCatalog {
    async fn search(
        &self,
        _auth: CatalogAuth<'_>,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<Vec<TrackCandidate>, CatalogError> {
        let rendered = query.to_query_string();
        self.searches.lock().unwrap().push(rendered.clone());
        if self.failing_queries.contains(&rendered) {
            return Err(CatalogError::Network("connection reset".into()));
        }
        let mut hits = self.results.get(&rendered).cloned().unwrap_or_default();
        hits.truncate(limit);
        Ok(hits)
    }

    async fn create_playlist(
        &self,
        _token: &str,
        options: &PlaylistOptions,
    ) -> Result<PlaylistRef, CatalogError> {
        if self.fail_create {
            return Err(CatalogError::Api {
                status: 503,
                message: "unavailable".into(),
            });
        }
        let mut created = self.created.lock().unwrap();
        created.push(options.clone());
        Ok(PlaylistRef {
            id: format!("playlist-{}", created.len()),
            name: options.name.clone(),
            url: None,
        })
    }

    async fn add_tracks(
        &self,
        _token: &str,
        _playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), CatalogError> {
        if self.fail_add {
            return Err(CatalogError::Network("timed out".into()));
        }
        self.add_calls.lock().unwrap().push(track_ids.to_vec());
        Ok(())
    }
}
