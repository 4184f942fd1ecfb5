//! # songreq Common Library
//!
//! Shared code for the song request service:
//! - Error taxonomy (validation, authentication, catalog, ledger misuse)
//! - Configuration loading (TOML file + environment overrides)
//! - Song request data model

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{RequestStatus, SongRequest};
