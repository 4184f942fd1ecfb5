//! songreq-web library
//!
//! Song request intake for visitors and playlist import for the organizer.
//! Exposes the application state and router for the binary and for
//! integration tests.

pub mod api;
pub mod catalog;
pub mod credential;
pub mod error;
pub mod ledger;
pub mod oauth;
pub mod orchestrator;
pub mod resolver;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use songreq_common::config::TomlConfig;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::catalog::CatalogService;
use crate::credential::SessionStore;
use crate::ledger::RequestLedger;
use crate::oauth::AuthorizationFlow;
use crate::orchestrator::{ImportOptions, ImportOrchestrator};

/// Listing and search caps applied by the HTTP layer
#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    pub recent_limit: usize,
    pub search_limit: usize,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Song request ledger (process lifetime only)
    pub ledger: Arc<RwLock<RequestLedger>>,
    /// Streaming-service catalog
    pub catalog: Arc<dyn CatalogService>,
    /// Organizer OAuth flow
    pub auth_flow: Arc<dyn AuthorizationFlow>,
    /// Session id → organizer credential
    pub sessions: SessionStore,
    pub importer: Arc<ImportOrchestrator>,
    pub limits: RequestLimits,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        config: &TomlConfig,
        catalog: Arc<dyn CatalogService>,
        auth_flow: Arc<dyn AuthorizationFlow>,
    ) -> Self {
        let importer = ImportOrchestrator::new(
            catalog.clone(),
            ImportOptions::from(&config.playlist),
        );
        Self {
            ledger: Arc::new(RwLock::new(RequestLedger::new())),
            catalog,
            auth_flow,
            sessions: SessionStore::new(),
            importer: Arc::new(importer),
            limits: RequestLimits {
                recent_limit: config.requests.recent_limit,
                search_limit: config.requests.search_limit,
            },
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Visitor and organizer pages
        .merge(api::ui_routes())
        // Submission, listing and search
        .merge(api::request_routes())
        .merge(api::search_routes())
        // Organizer: OAuth and import
        .merge(api::admin_routes())
        .merge(api::auth_routes())
        .merge(api::import_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
