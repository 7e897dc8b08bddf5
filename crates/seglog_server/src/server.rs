//! The produce/consume service facade.

use crate::error::{ServerError, ServerResult};
use crate::handler::RequestHandler;
use crate::messages::{
    ConsumeRequest, ConsumeResponse, ProduceRequest, ProduceResponse, RecordMessage,
};
use seglog_core::CommitLog;
use std::sync::Arc;

/// A transport-agnostic produce/consume server over a commit log.
///
/// The server exposes the operations a transport marshals into: produce,
/// consume, and a pull-based consume stream. An HTTP or RPC layer wraps
/// these in its own request handling; tests call them directly.
///
/// # Example
///
/// ```
/// use seglog_core::InMemoryLog;
/// use seglog_server::{LogServer, ProduceRequest, RecordMessage};
/// use std::sync::Arc;
///
/// let server = LogServer::new(Arc::new(InMemoryLog::new()));
///
/// let response = server
///     .produce(ProduceRequest {
///         record: RecordMessage { value: b"hello".to_vec(), offset: 0 },
///     })
///     .unwrap();
/// assert_eq!(response.offset, 0);
/// ```
pub struct LogServer<L> {
    handler: RequestHandler<L>,
    log: Arc<L>,
}

impl<L: CommitLog> LogServer<L> {
    /// Creates a server over the given log.
    pub fn new(log: Arc<L>) -> Self {
        Self {
            handler: RequestHandler::new(Arc::clone(&log)),
            log,
        }
    }

    /// Appends a record, returning its assigned offset.
    pub fn produce(&self, request: ProduceRequest) -> ServerResult<ProduceResponse> {
        self.handler.handle_produce(request)
    }

    /// Reads the record at an offset.
    pub fn consume(&self, request: ConsumeRequest) -> ServerResult<ConsumeResponse> {
        self.handler.handle_consume(request)
    }

    /// Starts a pull-based stream of records from `offset`.
    ///
    /// The stream yields records until it catches up with the head of the
    /// log, then ends. [`ConsumeStream::next_offset`] is the resume point:
    /// the caller polls again from there once new records may exist, which
    /// is exactly the retry-on-not-found loop a streaming transport runs.
    pub fn consume_stream(&self, offset: u64) -> ConsumeStream<'_, L> {
        ConsumeStream {
            log: self.log.as_ref(),
            next_offset: offset,
        }
    }

    /// Returns the log's current offset range as `(lowest, highest)`.
    ///
    /// `highest` is `None` while the log is empty.
    pub fn offsets(&self) -> ServerResult<(u64, Option<u64>)> {
        let lowest = self.log.lowest_offset()?;
        let highest = self.log.highest_offset()?;
        Ok((lowest, highest))
    }
}

/// A pull-based cursor over a log's records.
///
/// Ends (yields `None`) when it catches up with the head; re-create it from
/// [`next_offset`](Self::next_offset) to continue after more appends.
pub struct ConsumeStream<'a, L> {
    log: &'a L,
    next_offset: u64,
}

impl<L: CommitLog> ConsumeStream<'_, L> {
    /// The offset the next poll will read; the stream's resume point.
    #[must_use]
    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }
}

impl<L: CommitLog> Iterator for ConsumeStream<'_, L> {
    type Item = ServerResult<RecordMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.log.read(self.next_offset) {
            Ok(record) => {
                self.next_offset += 1;
                Some(Ok(record.into()))
            }
            // Caught up with the head. The caller resumes from
            // `next_offset` once new records may have arrived.
            Err(seglog_core::CoreError::OffsetOutOfRange { .. }) => None,
            Err(err) => Some(Err(ServerError::from(err))),
        }
    }
}
