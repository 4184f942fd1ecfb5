//! Spotify Web API client
//!
//! Implements `CatalogService` over `reqwest`. Visitor searches run under an
//! application token obtained with the client-credentials grant and cached
//! until shortly before it expires; playlist calls use the organizer's token.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use songreq_common::config::SpotifyConfig;
use std::time::Duration as StdDuration;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{
    CatalogAuth, CatalogError, CatalogService, PlaylistOptions, PlaylistRef, SearchQuery,
    TrackCandidate,
};
use crate::oauth::request_token;

const USER_AGENT: &str = concat!("songreq/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;
const TRACK_URI_PREFIX: &str = "spotify:track:";
/// Spotify ids are 22 base62 characters
const TRACK_ID_LEN: usize = 22;
/// Preferred artwork width in pixels for autocomplete thumbnails
const PREFERRED_ARTWORK_WIDTH: u32 = 300;

/// Shared HTTP client configuration for catalog and accounts calls
pub(crate) fn build_http_client() -> Result<reqwest::Client, CatalogError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(StdDuration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| CatalogError::Network(e.to_string()))
}

/// Map a non-success response into a `CatalogError`
pub(crate) async fn error_from_response(response: reqwest::Response) -> CatalogError {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return CatalogError::Unauthorized;
    }
    let message = response.text().await.unwrap_or_default();
    CatalogError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Convert a bare track id into a track URI; URIs pass through
pub fn track_uri(id: &str) -> String {
    if id.starts_with(TRACK_URI_PREFIX) {
        id.to_string()
    } else {
        format!("{}{}", TRACK_URI_PREFIX, id)
    }
}

/// Bare track id from a bare id or a `spotify:track:` URI
///
/// Returns `None` for anything else; such ids would make the whole bulk-add
/// chunk fail.
pub fn parse_track_id(value: &str) -> Option<&str> {
    let id = value.strip_prefix(TRACK_URI_PREFIX).unwrap_or(value);
    let well_formed =
        id.len() == TRACK_ID_LEN && id.chars().all(|c| c.is_ascii_alphanumeric());
    well_formed.then_some(id)
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Option<Paging<Track>>,
}

#[derive(Debug, Deserialize)]
struct Paging<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Track {
    id: Option<String>,
    name: String,
    #[serde(default)]
    artists: Vec<Artist>,
    album: Option<Album>,
}

#[derive(Debug, Deserialize)]
struct Artist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Album {
    #[serde(default)]
    images: Vec<Image>,
}

#[derive(Debug, Deserialize)]
struct Image {
    url: String,
    width: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CurrentUser {
    id: String,
}

#[derive(Debug, Serialize)]
struct CreatePlaylistBody<'a> {
    name: &'a str,
    description: &'a str,
    public: bool,
}

#[derive(Debug, Deserialize)]
struct CreatedPlaylist {
    id: String,
    name: String,
    external_urls: Option<ExternalUrls>,
}

#[derive(Debug, Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

#[derive(Debug, Serialize)]
struct AddTracksBody {
    uris: Vec<String>,
}

impl Track {
    /// Local or unavailable tracks carry no id and cannot be added
    fn into_candidate(self) -> Option<TrackCandidate> {
        let identifier = self.id?;
        let artist = self
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let artwork_url = self.album.and_then(|album| pick_artwork(album.images));
        Some(TrackCandidate {
            name: self.name,
            artist,
            identifier,
            artwork_url,
        })
    }
}

/// Image whose width is closest to the preferred thumbnail size
fn pick_artwork(images: Vec<Image>) -> Option<String> {
    images
        .into_iter()
        .min_by_key(|img| {
            img.width
                .map(|w| w.abs_diff(PREFERRED_ARTWORK_WIDTH))
                .unwrap_or(u32::MAX)
        })
        .map(|img| img.url)
}

struct AppToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Spotify Web API catalog
pub struct SpotifyCatalog {
    http: reqwest::Client,
    config: SpotifyConfig,
    app_token: Mutex<Option<AppToken>>,
}

impl SpotifyCatalog {
    pub fn new(config: SpotifyConfig) -> Result<Self, CatalogError> {
        Ok(Self {
            http: build_http_client()?,
            config,
            app_token: Mutex::new(None),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    /// Cached client-credentials token, fetched when missing or near expiry
    async fn app_access_token(&self) -> Result<String, CatalogError> {
        let mut cached = self.app_token.lock().await;

        if let Some(token) = cached.as_ref() {
            if Utc::now() + Duration::seconds(60) < token.expires_at {
                return Ok(token.access_token.clone());
            }
            debug!("Application token near expiry, requesting a new one");
        }

        let response =
            request_token(&self.http, &self.config, &[("grant_type", "client_credentials")])
                .await?;
        let access_token = response.access_token.clone();
        *cached = Some(AppToken {
            access_token: response.access_token,
            expires_at: Utc::now() + Duration::seconds(response.expires_in),
        });
        Ok(access_token)
    }

    async fn bearer(&self, auth: CatalogAuth<'_>) -> Result<String, CatalogError> {
        match auth {
            CatalogAuth::App => self.app_access_token().await,
            CatalogAuth::User(token) => Ok(token.to_string()),
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, CatalogError> {
        let response = request
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }

    async fn current_user_id(&self, token: &str) -> Result<String, CatalogError> {
        let user: CurrentUser = self
            .send_json(self.http.get(self.api_url("/me")).bearer_auth(token))
            .await?;
        Ok(user.id)
    }
}

#[async_trait]
impl CatalogService for SpotifyCatalog {
    async fn search(
        &self,
        auth: CatalogAuth<'_>,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<Vec<TrackCandidate>, CatalogError> {
        let q = query.to_query_string();
        if q.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let token = self.bearer(auth).await?;
        let limit = limit.min(songreq_common::config::MAX_SEARCH_LIMIT).to_string();

        debug!(query = %q, "Searching Spotify catalog");

        let response: SearchResponse = self
            .send_json(
                self.http
                    .get(self.api_url("/search"))
                    .bearer_auth(token)
                    .query(&[("q", q.as_str()), ("type", "track"), ("limit", limit.as_str())]),
            )
            .await?;

        Ok(parse_candidates(response))
    }

    async fn create_playlist(
        &self,
        token: &str,
        options: &PlaylistOptions,
    ) -> Result<PlaylistRef, CatalogError> {
        let user_id = self.current_user_id(token).await?;
        let url = self.api_url(&format!("/users/{}/playlists", user_id));

        let created: CreatedPlaylist = self
            .send_json(self.http.post(url).bearer_auth(token).json(&CreatePlaylistBody {
                name: &options.name,
                description: &options.description,
                public: options.public,
            }))
            .await?;

        info!(
            playlist_id = %created.id,
            user_id = %user_id,
            name = %created.name,
            "Created Spotify playlist"
        );

        Ok(PlaylistRef {
            id: created.id,
            name: created.name,
            url: created.external_urls.and_then(|u| u.spotify),
        })
    }

    async fn add_tracks(
        &self,
        token: &str,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), CatalogError> {
        if track_ids.is_empty() {
            return Ok(());
        }

        let url = self.api_url(&format!("/playlists/{}/tracks", playlist_id));
        let body = AddTracksBody {
            uris: track_ids.iter().map(|id| track_uri(id)).collect(),
        };

        // Response carries only a snapshot id.
        let _: serde_json::Value = self
            .send_json(self.http.post(url).bearer_auth(token).json(&body))
            .await?;

        debug!(playlist_id = %playlist_id, count = track_ids.len(), "Added tracks to playlist");
        Ok(())
    }
}

fn parse_candidates(response: SearchResponse) -> Vec<TrackCandidate> {
    response
        .tracks
        .map(|page| page.items)
        .unwrap_or_default()
        .into_iter()
        .filter_map(Track::into_candidate)
        .collect()
}
