//! Error handling

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// No classifier artifact could be loaded. Fatal to the scoring path:
    /// callers must see this rather than a defaulted verdict.
    #[error("model artifacts unavailable: {0}")]
    ModelUnavailable(String),

    #[error("model artifact is corrupt: {0}")]
    ArtifactIntegrity(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error surfaced by a [`crate::store::ScanStore`] implementation.
#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct StoreError(pub String);

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError(err.to_string())
    }
}
