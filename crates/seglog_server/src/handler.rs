//! Request handlers for the produce/consume endpoints.

use crate::error::ServerResult;
use crate::messages::{ConsumeRequest, ConsumeResponse, ProduceRequest, ProduceResponse};
use seglog_core::CommitLog;
use std::sync::Arc;

/// Handles produce and consume requests against a commit log.
///
/// Each handler is one step: convert the request, run the log operation,
/// wrap the result. Anything heavier than that belongs in the transport
/// above or the log below.
pub struct RequestHandler<L> {
    log: Arc<L>,
}

impl<L: CommitLog> RequestHandler<L> {
    /// Creates a handler over the given log.
    pub fn new(log: Arc<L>) -> Self {
        Self { log }
    }

    /// Appends the request's record and reports its assigned offset.
    ///
    /// Any offset carried by the incoming record is ignored; the log
    /// assigns one.
    pub fn handle_produce(&self, request: ProduceRequest) -> ServerResult<ProduceResponse> {
        let offset = self.log.append(request.record.into())?;
        Ok(ProduceResponse { offset })
    }

    /// Reads the record at the request's offset.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ServerError::OffsetNotFound`] when the offset is
    /// outside the log's current range.
    pub fn handle_consume(&self, request: ConsumeRequest) -> ServerResult<ConsumeResponse> {
        let record = self.log.read(request.offset)?;
        Ok(ConsumeResponse {
            record: record.into(),
        })
    }
}
