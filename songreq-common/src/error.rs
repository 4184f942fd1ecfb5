//! Common error types for songreq

use thiserror::Error;

use crate::models::RequestStatus;

/// Common result type for songreq operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the ledger, resolver and import orchestrator
#[derive(Error, Debug)]
pub enum Error {
    /// Bad or incomplete submission (user-correctable)
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Missing or expired organizer credential
    #[error("Not authenticated with the catalog service")]
    Unauthenticated,

    /// Transient upstream failure talking to the catalog service
    #[error("Catalog service unavailable: {0}")]
    CatalogUnavailable(String),

    /// Ledger id unknown (programming error, never user-facing)
    #[error("Song request not found: {0}")]
    RequestNotFound(u64),

    /// Attempted to move a request out of a terminal state
    #[error("Song request {id} is already {status}")]
    InvalidTransition { id: u64, status: RequestStatus },

    /// Another import run holds the import lock
    #[error("An import is already running")]
    ImportInProgress,

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
