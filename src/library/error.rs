use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("invalid input: {0}")]
    Validation(String),

    /// The conflicting favorite could not be read back, e.g. because a
    /// concurrent delete removed it. Retrying the request is expected to work.
    #[error("favorite {0} disappeared while being read back")]
    ReadbackMissing(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("schema error: {0:#}")]
    Schema(#[from] anyhow::Error),

    #[error("database connection lock poisoned")]
    ConnectionPoisoned,
}
