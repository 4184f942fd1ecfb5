//! Error types for songreq-web

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::catalog::CatalogError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Domain error from the ledger, resolver or orchestrator
    #[error(transparent)]
    Domain(#[from] songreq_common::Error),

    /// Catalog client error outside the import flow (e.g. autocomplete search)
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        use songreq_common::Error as E;
        match self {
            ApiError::Domain(err) => match err {
                E::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                E::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
                E::CatalogUnavailable(_) => (StatusCode::BAD_GATEWAY, "CATALOG_UNAVAILABLE"),
                E::RequestNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                E::ImportInProgress => (StatusCode::CONFLICT, "CONFLICT"),
                E::InvalidTransition { .. } | E::Config(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
            ApiError::Catalog(CatalogError::Unauthorized) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED")
            }
            ApiError::Catalog(CatalogError::NotConfigured(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "CATALOG_NOT_CONFIGURED")
            }
            ApiError::Catalog(_) => (StatusCode::BAD_GATEWAY, "CATALOG_UNAVAILABLE"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(code = error_code, error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
