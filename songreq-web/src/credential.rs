//! Organizer credential and session storage
//!
//! The import orchestrator only needs the `Credential` capability. Where the
//! token lives (here: an in-memory map keyed by a session cookie) is kept
//! separate from that capability.

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Cookie carrying the organizer's session id
pub const SESSION_COOKIE: &str = "songreq_session";

/// Cookie carrying the pending OAuth `state` value
pub const STATE_COOKIE: &str = "songreq_oauth_state";

/// Tokens this close to expiry are treated as expired
const EXPIRY_SKEW_SECS: i64 = 60;

/// Authorization permitting playlist-mutating catalog calls
pub trait Credential: Send + Sync {
    /// Present and not expired
    fn is_active(&self) -> bool;

    fn access_token(&self) -> &str;
}

/// OAuth access token issued by the catalog's accounts service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl OAuthToken {
    pub fn new(
        access_token: String,
        expires_in_secs: i64,
        refresh_token: Option<String>,
        scope: Option<String>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            scope,
            expires_at: Utc::now() + Duration::seconds(expires_in_secs),
        }
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty()
            && now + Duration::seconds(EXPIRY_SKEW_SECS) < self.expires_at
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }
}

impl Credential for OAuthToken {
    fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    fn access_token(&self) -> &str {
        &self.access_token
    }
}

/// Session-scoped credential holder
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, OAuthToken>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh session holding `token`
    pub async fn start(&self, token: OAuthToken) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(id, token);
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<OAuthToken> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Store a refreshed token for an existing session
    pub async fn replace(&self, id: Uuid, token: OAuthToken) {
        self.sessions.write().await.insert(id, token);
    }

    pub async fn end(&self, id: Uuid) -> Option<OAuthToken> {
        self.sessions.write().await.remove(&id)
    }

    /// Token for the session named by the request's cookie
    pub async fn from_headers(&self, headers: &HeaderMap) -> Option<(Uuid, OAuthToken)> {
        let id = session_id(headers)?;
        self.get(id).await.map(|token| (id, token))
    }
}

/// Read a cookie value from the request headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    read_cookie(headers, SESSION_COOKIE).and_then(|v| Uuid::parse_str(&v).ok())
}

/// `Set-Cookie` value for an HttpOnly, same-site cookie
pub fn set_cookie(name: &str, value: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", name, value)
}

/// `Set-Cookie` value that deletes the cookie
pub fn clear_cookie(name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name)
}
