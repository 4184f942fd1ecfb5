//! Song request data model
//!
//! A `SongRequest` is created `Pending` and moves exactly once into one of
//! the terminal states `Imported` or `NotFound`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Lifecycle state of a song request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Waiting for the next import run
    Pending,
    /// Resolved and added to a playlist batch
    Imported,
    /// No catalog track could be resolved
    NotFound,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Imported => "imported",
            RequestStatus::NotFound => "not_found",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A visitor's song request as held by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRequest {
    /// Sequential id, starting at 1
    pub id: u64,
    pub artist: String,
    pub title: String,
    /// Catalog track identifier chosen from autocomplete, if any
    pub catalog_id: Option<String>,
    pub artwork_url: Option<String>,
    pub status: RequestStatus,
    pub submitted_at: DateTime<Utc>,
}

impl SongRequest {
    /// Create a new pending request
    pub fn new(
        id: u64,
        artist: String,
        title: String,
        catalog_id: Option<String>,
        artwork_url: Option<String>,
    ) -> Self {
        Self {
            id,
            artist,
            title,
            catalog_id,
            artwork_url,
            status: RequestStatus::Pending,
            submitted_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Move into a terminal state
    ///
    /// Fails with `InvalidTransition` when the request already left `Pending`,
    /// or when the target is `Pending` itself.
    pub fn transition_to(&mut self, status: RequestStatus) -> Result<()> {
        if self.status.is_terminal() || !status.is_terminal() {
            return Err(Error::InvalidTransition {
                id: self.id,
                status: self.status,
            });
        }
        self.status = status;
        Ok(())
    }

    /// "Artist - Title" label used in logs and summaries
    pub fn label(&self) -> String {
        match (self.artist.is_empty(), self.title.is_empty()) {
            (false, false) => format!("{} - {}", self.artist, self.title),
            (true, false) => self.title.clone(),
            (false, true) => self.artist.clone(),
            (true, true) => self
                .catalog_id
                .clone()
                .unwrap_or_else(|| format!("request #{}", self.id)),
        }
    }
}
