//! Client error types.

use thiserror::Error;
use uuid::Uuid;

/// Error returned by [`crate::SiteforgeClient`].
#[derive(Error, Debug, Clone)]
pub enum ClientError {
    /// The node could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The node rejected the bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// A build was rejected or failed.
    #[error("Build error ({status}): {error}: {details}")]
    Build {
        status: u16,
        error: String,
        details: String,
        pre_version_id: Option<Uuid>,
    },

    /// Any other non-success response.
    #[error("HTTP {status}: {details}")]
    Http { status: u16, details: String },

    /// A response body could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}

/// Convenience Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
