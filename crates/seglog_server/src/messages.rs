//! Produce/consume request and response types.
//!
//! These are plain data carriers, serde-derived so any transport can
//! marshal them (JSON over HTTP, a binary RPC codec, ...). The service
//! itself never touches a wire format.

use serde::{Deserialize, Serialize};

/// A record as it crosses the service boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMessage {
    /// Opaque payload bytes.
    pub value: Vec<u8>,
    /// Offset of the record. Ignored on produce; assigned by the log.
    #[serde(default)]
    pub offset: u64,
}

impl From<seglog_core::Record> for RecordMessage {
    fn from(record: seglog_core::Record) -> Self {
        Self {
            value: record.value,
            offset: record.offset,
        }
    }
}

impl From<RecordMessage> for seglog_core::Record {
    fn from(message: RecordMessage) -> Self {
        Self {
            value: message.value,
            offset: message.offset,
        }
    }
}

/// Asks the log to append a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProduceRequest {
    /// The record to append. Its offset field is ignored.
    pub record: RecordMessage,
}

/// Tells the caller which offset the record was stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProduceResponse {
    /// The assigned offset.
    pub offset: u64,
}

/// Asks the log for the record at an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumeRequest {
    /// The offset to read.
    pub offset: u64,
}

/// Carries the requested record back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumeResponse {
    /// The record stored at the requested offset.
    pub record: RecordMessage,
}
