//! Error types for the log core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in log core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A read requested an offset outside the range currently held by the log.
    #[error("offset {offset} out of range [{lowest}, {next})")]
    OffsetOutOfRange {
        /// The requested offset.
        offset: u64,
        /// The lowest offset present.
        lowest: u64,
        /// The offset the next append will receive (one past the highest).
        next: u64,
    },

    /// The index has no room for another entry.
    ///
    /// The log recovers from this internally by rolling over to a new
    /// segment; callers only see it if they drive a segment directly.
    #[error("index full: {size} of {max_bytes} bytes in use")]
    IndexFull {
        /// Bytes of index currently in use.
        size: u64,
        /// Configured maximum index size.
        max_bytes: u64,
    },

    /// An index entry lookup went past the last entry in use.
    #[error("index entry {entry} out of bounds: index holds {entries} entries")]
    IndexEntryOutOfBounds {
        /// The requested entry number.
        entry: u64,
        /// The number of entries in use.
        entries: u64,
    },

    /// A record could not be encoded or decoded.
    #[error("invalid record: {message}")]
    InvalidRecord {
        /// Description of the problem.
        message: String,
    },

    /// The component has been closed; no further operations are possible.
    #[error("log is closed")]
    Closed,
}

impl CoreError {
    /// Creates an invalid record error.
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }
}
