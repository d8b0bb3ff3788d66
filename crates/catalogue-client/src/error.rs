//! Error types for archive access.

use thiserror::Error;

/// Errors surfaced while talking to the product archive.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// The attribute catalogue could not be fetched or parsed. Nothing is
    /// cached when this happens, so the next call retries.
    #[error("Attribute catalogue unavailable: {0}")]
    CatalogUnavailable(String),

    /// Query construction failed before any request went out.
    #[error(transparent)]
    Query(#[from] odata_query::QueryError),

    /// Transport-level failure.
    #[error("Catalogue request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The archive answered with a non-success status.
    #[error("Catalogue returned {status} for {url}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    /// A response body did not match the expected JSON shape.
    #[error("Failed to parse catalogue response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Token exchange with the identity endpoint failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// A product payload could not be retrieved.
    #[error("Product download failed: {0}")]
    Download(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
