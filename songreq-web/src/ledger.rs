//! Request ledger
//!
//! Ordered in-memory registry of song requests. Ids are assigned
//! sequentially from 1 in insertion order; entries are never removed, only
//! moved from `Pending` into a terminal status.
//!
//! The ledger itself is not synchronized. `AppState` wraps it in a
//! `tokio::sync::RwLock` so that every mutation happens under the write lock.

use serde::Deserialize;
use songreq_common::{Error, RequestStatus, Result, SongRequest};
use tracing::{debug, warn};

use crate::catalog::spotify::parse_track_id;

/// Longest accepted value for any submitted field
pub const MAX_FIELD_LEN: usize = 200;

/// Raw submission as received from a visitor
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequest {
    #[serde(default)]
    pub artist: String,
    #[serde(default, alias = "song")]
    pub title: String,
    #[serde(default, alias = "catalog_id")]
    pub catalog_id: Option<String>,
    #[serde(default, alias = "artwork_url")]
    pub artwork_url: Option<String>,
}

impl NewRequest {
    /// Legacy free-text submission
    pub fn free_text(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Submission picked from catalog autocomplete
    pub fn from_catalog(
        artist: impl Into<String>,
        title: impl Into<String>,
        catalog_id: impl Into<String>,
        artwork_url: Option<String>,
    ) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            catalog_id: Some(catalog_id.into()),
            artwork_url,
        }
    }
}

/// Owned registry of song requests
#[derive(Debug)]
pub struct RequestLedger {
    entries: Vec<SongRequest>,
    next_id: u64,
}

impl Default for RequestLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestLedger {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Validate and append a submission
    ///
    /// Accepts either a catalog identifier (autocomplete) or a non-empty
    /// artist/title pair (free text). Catalog identifiers must be track ids
    /// or track URIs and are stored as bare ids. Returns the stored entry.
    pub fn submit(&mut self, request: NewRequest) -> Result<SongRequest> {
        let artist = request.artist.trim().to_string();
        let title = request.title.trim().to_string();
        let catalog_id = non_blank(request.catalog_id);
        let artwork_url = non_blank(request.artwork_url);

        for (field, value) in [
            ("artist", Some(&artist)),
            ("title", Some(&title)),
            ("catalog id", catalog_id.as_ref()),
            ("artwork URL", artwork_url.as_ref()),
        ] {
            if value.is_some_and(|v| v.chars().count() > MAX_FIELD_LEN) {
                return Err(Error::Validation(format!(
                    "{} must be at most {} characters",
                    field, MAX_FIELD_LEN
                )));
            }
        }

        let catalog_id = catalog_id
            .map(|id| {
                parse_track_id(&id).map(str::to_string).ok_or_else(|| {
                    Error::Validation(format!("'{}' is not a valid track identifier", id))
                })
            })
            .transpose()?;

        if catalog_id.is_none() && (artist.is_empty() || title.is_empty()) {
            return Err(Error::Validation(
                "Please enter both an artist and a song title".to_string(),
            ));
        }

        let artwork_url = artwork_url.filter(|url| {
            let ok = is_web_url(url);
            if !ok {
                warn!(artwork_url = %url, "Dropping artwork URL that is not http(s)");
            }
            ok
        });

        let entry = SongRequest::new(self.next_id, artist, title, catalog_id, artwork_url);
        self.next_id += 1;

        debug!(
            id = entry.id,
            artist = %entry.artist,
            title = %entry.title,
            has_catalog_id = entry.catalog_id.is_some(),
            "Song request recorded"
        );

        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Up to `limit` most recent entries, newest first
    pub fn list_recent(&self, limit: usize) -> Vec<SongRequest> {
        self.entries.iter().rev().take(limit).cloned().collect()
    }

    /// Every entry, oldest first
    pub fn list_all(&self) -> Vec<SongRequest> {
        self.entries.clone()
    }

    /// Snapshot of pending entries in insertion order
    pub fn pending(&self) -> Vec<SongRequest> {
        self.entries
            .iter()
            .filter(|e| e.is_pending())
            .cloned()
            .collect()
    }

    pub fn get(&self, id: u64) -> Option<&SongRequest> {
        // Ids are dense and start at 1, so the index is id - 1.
        let index = usize::try_from(id.checked_sub(1)?).ok()?;
        self.entries.get(index).filter(|e| e.id == id)
    }

    pub fn mark_imported(&mut self, id: u64) -> Result<()> {
        self.transition(id, RequestStatus::Imported)
    }

    pub fn mark_not_found(&mut self, id: u64) -> Result<()> {
        self.transition(id, RequestStatus::NotFound)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn transition(&mut self, id: u64, status: RequestStatus) -> Result<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(Error::RequestNotFound(id))?;
        entry.transition_to(status)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_web_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}
