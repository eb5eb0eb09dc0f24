use std::path::PathBuf;
use thiserror::Error;

/// Failure while fetching a page over HTTP. Recoverable: the caller
/// decides whether to retry, nothing has been written anywhere.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Failure while writing the link store. The previously persisted file and
/// the in-memory document are both intact when this is returned.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("could not serialize link document: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
