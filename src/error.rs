//! Error types for Gopherman

use std::io;
use thiserror::Error;

/// Result type for Gopherman operations
pub type Result<T> = std::result::Result<T, GophermanError>;

/// Errors that can occur in Gopherman
#[derive(Debug, Error)]
pub enum GophermanError {
    /// I/O error (file access, body drain)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Stored JSON could not be decoded into the requested shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// A collection could not be serialized
    #[error("Encode error: {0}")]
    Encode(String),

    /// Malformed substitution template
    #[error("Template error in '{template}': {reason}")]
    Template {
        /// The offending template
        template: String,
        /// What is wrong with it
        reason: String,
    },

    /// A stored request could not be turned into a live request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A live request could not be sent
    #[error("Transport error: {0}")]
    Transport(String),

    /// Replayed request answered with a non-success status
    #[error("Unexpected status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Named item missing from a collection
    #[error("Item with name '{name}' doesn't exist")]
    NotFound {
        /// Requested item name
        name: String,
    },

    /// Caller-supplied comparison failed
    #[error("Verification failed: {0}")]
    Verification(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<serde_json::Error> for GophermanError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// A replay failure annotated with the collection and request under test
#[derive(Debug, Error)]
#[error("[{collection}] {request}: {source}")]
pub struct ReplayError {
    /// Name of the collection the request was replayed from
    pub collection: String,
    /// Name of the replayed request
    pub request: String,
    /// Underlying failure
    #[source]
    pub source: GophermanError,
}

impl ReplayError {
    /// Wrap an error with collection/request provenance
    #[must_use]
    pub fn new(collection: &str, request: &str, source: GophermanError) -> Self {
        Self {
            collection: collection.to_string(),
            request: request.to_string(),
            source,
        }
    }
}
