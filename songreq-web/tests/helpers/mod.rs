//! Test Helper Utilities
//!
//! In-process fakes for the catalog and the OAuth flow, plus request and
//! response helpers shared by the API tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use http_body_util::BodyExt;
use serde_json::Value;
use songreq_common::config::TomlConfig;
use songreq_web::catalog::{
    CatalogAuth, CatalogError, CatalogService, PlaylistOptions, PlaylistRef, SearchQuery,
    TrackCandidate,
};
use songreq_web::credential::OAuthToken;
use songreq_web::oauth::AuthorizationFlow;
use songreq_web::{build_router, AppState};
use uuid::Uuid;

/// Authorization code the fake flow accepts
pub const GOOD_CODE: &str = "good-code";

/// Catalog keyed by rendered query string
#[derive(Default)]
pub struct FakeCatalog {
    hits: HashMap<String, Vec<TrackCandidate>>,
    pub fail_search: bool,
    pub created: Mutex<Vec<PlaylistOptions>>,
    /// Organizer token seen by each playlist creation
    pub create_tokens: Mutex<Vec<String>>,
    pub added: Mutex<Vec<Vec<String>>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `candidate` as the answer for `query`
    pub fn with_hit(mut self, query: &str, candidate: TrackCandidate) -> Self {
        self.hits.entry(query.to_string()).or_default().push(candidate);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn added_tracks(&self) -> Vec<String> {
        self.added.lock().unwrap().iter().flatten().cloned().collect()
    }
}

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn search(
        &self,
        _auth: CatalogAuth<'_>,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<Vec<TrackCandidate>, CatalogError> {
        if self.fail_search {
            return Err(CatalogError::Network("connection refused".into()));
        }
        let mut hits = self
            .hits
            .get(&query.to_query_string())
            .cloned()
            .unwrap_or_default();
        hits.truncate(limit);
        Ok(hits)
    }

    async fn create_playlist(
        &self,
        token: &str,
        options: &PlaylistOptions,
    ) -> Result<PlaylistRef, CatalogError> {
        self.create_tokens.lock().unwrap().push(token.to_string());
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
        self.added.lock().unwrap().push(track_ids.to_vec());
        Ok(())
    }
}

/// OAuth flow that accepts `GOOD_CODE` and rejects everything else
pub struct FakeAuthFlow {
    /// Lifetime of tokens issued by `exchange_code`; 0 yields an expired token
    pub token_lifetime_secs: i64,
    pub fail_refresh: bool,
    pub refresh_calls: Mutex<usize>,
}

impl Default for FakeAuthFlow {
    fn default() -> Self {
        Self {
            token_lifetime_secs: 3600,
            fail_refresh: false,
            refresh_calls: Mutex::new(0),
        }
    }
}

impl FakeAuthFlow {
    /// Issues tokens that are already expired but carry a refresh token
    pub fn expiring() -> Self {
        Self {
            token_lifetime_secs: 0,
            ..Self::default()
        }
    }

    pub fn refresh_count(&self) -> usize {
        *self.refresh_calls.lock().unwrap()
    }
}

#[async_trait]
impl AuthorizationFlow for FakeAuthFlow {
    fn authorize_url(&self, state: &str) -> Result<String, CatalogError> {
        Ok(format!("https://accounts.test/authorize?state={}", state))
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthToken, CatalogError> {
        if code == GOOD_CODE {
            Ok(OAuthToken::new(
                "user-token".into(),
                self.token_lifetime_secs,
                Some("refresh-token".into()),
                None,
            ))
        } else {
            Err(CatalogError::Unauthorized)
        }
    }

    async fn refresh(&self, _token: &OAuthToken) -> Result<OAuthToken, CatalogError> {
        *self.refresh_calls.lock().unwrap() += 1;
        if self.fail_refresh {
            return Err(CatalogError::Api {
                status: 400,
                message: "invalid_grant".into(),
            });
        }
        Ok(OAuthToken::new(
            "refreshed-token".into(),
            3600,
            Some("refresh-token".into()),
            None,
        ))
    }
}

pub fn candidate(artist: &str, name: &str, identifier: &str) -> TrackCandidate {
    TrackCandidate {
        name: name.to_string(),
        artist: artist.to_string(),
        identifier: identifier.to_string(),
        artwork_url: None,
    }
}

/// Application state over the given catalog with default configuration
pub fn test_state(catalog: Arc<FakeCatalog>) -> AppState {
    test_state_with_auth(catalog, Arc::new(FakeAuthFlow::default()))
}

pub fn test_state_with_auth(catalog: Arc<FakeCatalog>, auth_flow: Arc<FakeAuthFlow>) -> AppState {
    AppState::new(&TomlConfig::default(), catalog, auth_flow)
}

pub fn test_app(catalog: Arc<FakeCatalog>) -> axum::Router {
    build_router(test_state(catalog))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_with_cookie(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

pub fn location(response: &Response<Body>) -> String {
    response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string()
}

/// Session id carried by a `songreq_session=<uuid>` cookie pair
pub fn session_uuid(cookie_pair: &str) -> Uuid {
    let (_, value) = cookie_pair.split_once('=').unwrap();
    Uuid::parse_str(value).unwrap()
}

/// `name=value` pair from the response's `Set-Cookie` headers
pub fn cookie_pair(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with(&format!("{}=", name)))
        .map(str::to_string)
}
