//! Error types for the herald pipeline

use thiserror::Error;

/// Result type alias for herald operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the herald pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Local input file does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Content-type inference yielded no result
    #[error("unknown media type: {0}")]
    UnknownMediaType(String),

    /// Resumable upload start phase failed
    #[error("upload init error: {0}")]
    UploadInit(String),

    /// Resumable upload transfer phase failed
    #[error("upload transfer error: {0}")]
    UploadTransfer(String),

    /// Expected JSON field path absent from a service response
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Well-formed envelope with no usable content (e.g. safety-filtered)
    #[error("empty response: {0}")]
    EmptyResponse(String),

    /// Speech synthesis service rejected the request
    #[error("speech synthesis error: {0}")]
    Synthesis(String),

    /// External transcoding process failed
    #[error("transcode error: {0}")]
    Transcode(String),

    /// Network-level failure (DNS, timeout, connection reset)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
