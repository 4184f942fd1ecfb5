//! Import orchestrator
//!
//! Turns pending ledger entries into one new catalog playlist:
//!
//! 1. Create the playlist (fatal on failure, ledger untouched)
//! 2. Snapshot pending entries, resolve each one, mark it `imported` or
//!    `not_found` as soon as its outcome is known
//! 3. Bulk-add the resolved ids in chunks of `batch_size`
//!
//! Resolution errors are contained to their entry. A bulk-add error is fatal
//! and nothing is rolled back: entries already marked keep their status.
//! The playlist is created even when no track ends up in it.

use serde::Serialize;
use songreq_common::config::{PlaylistConfig, MAX_BATCH_SIZE};
use songreq_common::{Error, RequestStatus, Result, SongRequest};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

use crate::catalog::{CatalogService, PlaylistOptions, PlaylistRef};
use crate::credential::Credential;
use crate::ledger::RequestLedger;
use crate::resolver::{Resolution, TrackResolver};

/// Fixed per-run settings
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub playlist: PlaylistOptions,
    /// Track ids per bulk-add call
    pub batch_size: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self::from(&PlaylistConfig::default())
    }
}

impl From<&PlaylistConfig> for ImportOptions {
    fn from(config: &PlaylistConfig) -> Self {
        Self {
            playlist: PlaylistOptions::from(config),
            batch_size: config.batch_size,
        }
    }
}

/// Per-entry result of an import run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub request_id: u64,
    pub artist: String,
    pub title: String,
    pub status: RequestStatus,
    pub track_id: Option<String>,
    pub matched_name: Option<String>,
}

/// Result of a completed import run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub playlist: PlaylistRef,
    pub imported: usize,
    pub not_found: usize,
    pub tracks_added: usize,
    pub add_calls: usize,
    pub outcomes: Vec<ImportOutcome>,
}

/// Runs imports one at a time
pub struct ImportOrchestrator {
    catalog: Arc<dyn CatalogService>,
    resolver: TrackResolver,
    options: ImportOptions,
    running: Mutex<()>,
}

impl ImportOrchestrator {
    pub fn new(catalog: Arc<dyn CatalogService>, options: ImportOptions) -> Self {
        let batch_size = options.batch_size.clamp(1, MAX_BATCH_SIZE);
        if batch_size != options.batch_size {
            warn!(
                requested = options.batch_size,
                using = batch_size,
                "Clamping import batch size"
            );
        }
        Self {
            resolver: TrackResolver::new(catalog.clone()),
            catalog,
            options: ImportOptions {
                batch_size,
                ..options
            },
            running: Mutex::new(()),
        }
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Import every pending ledger entry into a new playlist
    ///
    /// Fails with `Unauthenticated` when `credential` is missing or inactive
    /// and with `ImportInProgress` when another run holds the import lock.
    pub async fn run(
        &self,
        ledger: &RwLock<RequestLedger>,
        credential: Option<&dyn Credential>,
    ) -> Result<ImportSummary> {
        let credential = credential
            .filter(|c| c.is_active())
            .ok_or(Error::Unauthenticated)?;
        let token = credential.access_token();

        let _guard = self.running.try_lock().map_err(|_| Error::ImportInProgress)?;

        let playlist = self
            .catalog
            .create_playlist(token, &self.options.playlist)
            .await
            .map_err(|e| {
                error!(error = %e, "Playlist creation failed");
                Error::from(e)
            })?;

        let pending = ledger.read().await.pending();
        info!(
            playlist_id = %playlist.id,
            pending = pending.len(),
            "Import started"
        );

        let mut batch = Vec::with_capacity(pending.len());
        let mut outcomes = Vec::with_capacity(pending.len());

        for request in &pending {
            let outcome = self.import_one(ledger, request, token, &mut batch).await;
            if let Some(outcome) = outcome {
                outcomes.push(outcome);
            }
        }

        let add_calls = self.commit(token, &playlist, &batch).await?;

        let imported = count(&outcomes, RequestStatus::Imported);
        let not_found = count(&outcomes, RequestStatus::NotFound);
        info!(
            playlist_id = %playlist.id,
            imported,
            not_found,
            add_calls,
            "Import finished"
        );

        Ok(ImportSummary {
            playlist,
            imported,
            not_found,
            tracks_added: batch.len(),
            add_calls,
            outcomes,
        })
    }

    /// Resolve and mark a single entry; `None` if it was no longer pending
    async fn import_one(
        &self,
        ledger: &RwLock<RequestLedger>,
        request: &SongRequest,
        token: &str,
        batch: &mut Vec<String>,
    ) -> Option<ImportOutcome> {
        let resolution = match self.resolver.resolve(request, token).await {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!(
                    request_id = request.id,
                    error = %e,
                    "Resolution failed, marking request not found"
                );
                Resolution::Unresolved
            }
        };

        let (status, track) = match resolution {
            Resolution::Resolved(track) => (RequestStatus::Imported, Some(track)),
            Resolution::Unresolved => (RequestStatus::NotFound, None),
        };

        let marked = {
            let mut ledger = ledger.write().await;
            match status {
                RequestStatus::Imported => ledger.mark_imported(request.id),
                _ => ledger.mark_not_found(request.id),
            }
        };
        if let Err(e) = marked {
            warn!(request_id = request.id, error = %e, "Skipping request changed during import");
            return None;
        }

        match &track {
            Some(track) => {
                info!(
                    "Found: {} -> {}",
                    request.label(),
                    track.matched_name.as_deref().unwrap_or(&track.track_id)
                );
                batch.push(track.track_id.clone());
            }
            None => info!("Not found: {}", request.label()),
        }

        Some(ImportOutcome {
            request_id: request.id,
            artist: request.artist.clone(),
            title: request.title.clone(),
            status,
            matched_name: track.as_ref().and_then(|t| t.matched_name.clone()),
            track_id: track.map(|t| t.track_id),
        })
    }

    /// Bulk-add `batch` in chunks; returns the number of calls made
    async fn commit(&self, token: &str, playlist: &PlaylistRef, batch: &[String]) -> Result<usize> {
        let mut calls = 0;
        for chunk in batch.chunks(self.options.batch_size) {
            self.catalog
                .add_tracks(token, &playlist.id, chunk)
                .await
                .map_err(|e| {
                    error!(
                        playlist_id = %playlist.id,
                        added_before_failure = calls * self.options.batch_size,
                        error = %e,
                        "Adding tracks failed"
                    );
                    Error::CatalogUnavailable(format!(
                        "adding tracks to playlist '{}' failed: {}",
                        playlist.name, e
                    ))
                })?;
            calls += 1;
        }
        Ok(calls)
    }
}

fn count(outcomes: &[ImportOutcome], status: RequestStatus) -> usize {
    outcomes.iter().filter(|o| o.status == status).count()
}
