//! Error types for the service layer.

use seglog_core::CoreError;
use thiserror::Error;

/// Result type for service operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while serving produce/consume requests.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A consume named an offset the log does not hold.
    ///
    /// Kept distinct from [`ServerError::Log`] so transports can map it to
    /// their not-found shape (HTTP 404, a gRPC status, and so on), and so
    /// streaming consumers can tell "caught up" from real failures.
    #[error("offset {offset} not found")]
    OffsetNotFound {
        /// The requested offset.
        offset: u64,
    },

    /// The underlying log failed.
    #[error("log error: {0}")]
    Log(CoreError),
}

impl From<CoreError> for ServerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::OffsetOutOfRange { offset, .. } => Self::OffsetNotFound { offset },
            other => Self::Log(other),
        }
    }
}
