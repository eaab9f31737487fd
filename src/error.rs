//! Typed errors for the extraction, matching and storage layers.

use crate::types::EntityType;
use thiserror::Error;

/// Fetching a listing or detail page failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatchError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write {entity} table at {path}: {source}")]
    Io {
        entity: EntityType,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {entity} table: {source}")]
    Serialize {
        entity: EntityType,
        #[source]
        source: serde_json::Error,
    },
}

/// A configured CSS selector could not be parsed.
#[derive(Debug, Error)]
#[error("invalid selector '{selector}': {message}")]
pub struct SelectorError {
    pub selector: String,
    pub message: String,
}
