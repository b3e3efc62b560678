use thiserror::Error;

/// Errors surfaced by the upstream catalog client and the flows built on it.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("upstream returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("malformed upstream item: {0}")]
    MalformedItem(String),
}
