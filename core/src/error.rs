//! Error types for the pet-shelter API client.
//!
//! # Design
//! The seven API operations never turn an HTTP status into an error: a 403
//! or a 500 is an ordinary `ApiResponse` the caller asserts on. `ApiError`
//! covers what has no status to report (transport failures, an unreadable
//! photo, bad settings) plus typed decoding through
//! [`ApiResponse::decode`](crate::types::ApiResponse::decode).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404 where a record was expected.
    #[error("resource not found")]
    NotFound,

    /// The server returned a status other than 200 or 404 where a record was expected.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request never produced an HTTP response.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The photo to upload could not be read.
    #[error("failed to read photo {}: {source}", .path.display())]
    Photo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

impl From<figment::Error> for ApiError {
    fn from(err: figment::Error) -> Self {
        ApiError::Config(err.to_string())
    }
}
