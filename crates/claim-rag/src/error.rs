//! Error types for the claim adjudication system

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for claim-rag operations
pub type Result<T> = std::result::Result<T, Error>;

/// Claim RAG errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File parsing error
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// Unsupported file type
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// No snapshot at the configured index path
    #[error("Vector index snapshot not found at '{}'", .0.display())]
    IndexNotFound(PathBuf),

    /// Vector index error (build, query or corrupt snapshot)
    #[error("Vector index error: {0}")]
    VectorIndex(String),

    /// Remote language model failure (network, auth, quota, malformed body)
    #[error("Remote model service error: {message}")]
    RemoteService {
        message: String,
        /// Whether another attempt may succeed
        retryable: bool,
    },

    /// Remote language model did not answer in time
    #[error("Remote model service timed out after {0}s")]
    LlmTimeout(u64),

    /// Bad client request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a vector index error
    pub fn vector_index(message: impl Into<String>) -> Self {
        Self::VectorIndex(message.into())
    }

    /// Create a non-retryable remote service error
    pub fn remote(message: impl Into<String>) -> Self {
        Self::RemoteService {
            message: message.into(),
            retryable: false,
        }
    }

    /// Create a retryable remote service error
    pub fn remote_transient(message: impl Into<String>) -> Self {
        Self::RemoteService {
            message: message.into(),
            retryable: true,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether a failed remote call is worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::RemoteService { retryable, .. } => *retryable,
            Error::LlmTimeout(_) => true,
            _ => false,
        }
    }
}

impl From<ruvector_core::RuvectorError> for Error {
    fn from(err: ruvector_core::RuvectorError) -> Self {
        Error::VectorIndex(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error", msg.clone()),
            Error::FileParse { filename, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "parse_error",
                format!("Failed to parse '{}': {}", filename, message),
            ),
            Error::UnsupportedFileType(ext) => (
                StatusCode::BAD_REQUEST,
                "unsupported_type",
                format!("Unsupported file type: {}", ext),
            ),
            Error::Embedding(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "embedding_error", msg.clone())
            }
            Error::IndexNotFound(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "index_not_found",
                self.to_string(),
            ),
            Error::VectorIndex(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "vector_index_error", msg.clone())
            }
            Error::RemoteService { message, .. } => (
                StatusCode::BAD_GATEWAY,
                "remote_service_error",
                message.clone(),
            ),
            Error::LlmTimeout(_) => (
                StatusCode::GATEWAY_TIMEOUT,
                "remote_service_timeout",
                self.to_string(),
            ),
            Error::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                err.to_string(),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
            Error::Http(err) => (
                StatusCode::BAD_GATEWAY,
                "remote_service_error",
                err.to_string(),
            ),
            Error::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        if status.is_server_error() {
            tracing::error!(error_type, "{}", message);
        }

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
