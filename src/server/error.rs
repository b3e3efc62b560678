use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::catalog::CatalogError;
use crate::library::LibraryError;

/// Anything a handler can fail with. Rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Library(#[from] LibraryError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Catalog(err) => catalog_status(err),
            ApiError::Library(err) => library_status(err),
        }
    }

    fn message(&self) -> String {
        match self {
            // Store internals are logged, never sent out
            ApiError::Library(
                LibraryError::Sqlite(_) | LibraryError::Schema(_) | LibraryError::ConnectionPoisoned,
            ) => "internal storage error".to_string(),
            ApiError::Catalog(CatalogError::Transport(err)) if err.is_timeout() => {
                "upstream catalog timed out".to_string()
            }
            ApiError::Catalog(CatalogError::Transport(_)) => {
                "upstream catalog unreachable".to_string()
            }
            other => other.to_string(),
        }
    }
}

fn catalog_status(err: &CatalogError) -> StatusCode {
    match err {
        CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
        CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::Upstream { status, .. } => match StatusCode::from_u16(*status) {
            Ok(code) if code.is_server_error() => code,
            Ok(StatusCode::TOO_MANY_REQUESTS) => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::BAD_GATEWAY,
        },
        CatalogError::Transport(err) if err.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
        CatalogError::Transport(_) => StatusCode::BAD_GATEWAY,
        CatalogError::Decode(_) | CatalogError::MalformedItem(_) => StatusCode::BAD_GATEWAY,
    }
}

fn library_status(err: &LibraryError) -> StatusCode {
    match err {
        LibraryError::Validation(_) => StatusCode::BAD_REQUEST,
        LibraryError::ReadbackMissing(_) => StatusCode::SERVICE_UNAVAILABLE,
        LibraryError::Sqlite(_) | LibraryError::Schema(_) | LibraryError::ConnectionPoisoned => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match &self {
                ApiError::Library(_) => error!("Request failed with {}: {}", status, self),
                _ => warn!("Request failed with {}: {}", status, self),
            }
        } else {
            debug!("Request rejected with {}: {}", status, self);
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}
