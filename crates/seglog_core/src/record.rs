//! Record type and its on-disk encoding.

use crate::error::{CoreError, CoreResult};

/// Width of the encoded offset field.
const OFFSET_WIDTH: usize = 8;

/// A single record in the log: an opaque payload plus the offset the log
/// assigned to it at append time.
///
/// Offsets on incoming records are ignored; the log overwrites them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    /// Opaque payload bytes.
    pub value: Vec<u8>,
    /// Offset assigned by the log.
    pub offset: u64,
}

impl Record {
    /// Creates a record from a payload. The offset is assigned on append.
    #[must_use]
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self {
            value: value.into(),
            offset: 0,
        }
    }

    /// Encodes the record to bytes: offset (8 bytes big-endian) followed by
    /// the raw payload. The store frames the result with a length prefix, so
    /// no length field is encoded here.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_size());
        buf.extend_from_slice(&self.offset.to_be_bytes());
        buf.extend_from_slice(&self.value);
        buf
    }

    /// Decodes a record from bytes previously produced by [`encode`](Self::encode).
    pub fn decode(data: &[u8]) -> CoreResult<Self> {
        if data.len() < OFFSET_WIDTH {
            return Err(CoreError::invalid_record(format!(
                "record too short: {} bytes, need at least {OFFSET_WIDTH}",
                data.len()
            )));
        }

        let offset = u64::from_be_bytes(
            data[..OFFSET_WIDTH]
                .try_into()
                .expect("slice is exactly 8 bytes"),
        );

        Ok(Self {
            value: data[OFFSET_WIDTH..].to_vec(),
            offset,
        })
    }

    /// Returns the encoded size of this record, excluding the store's
    /// length prefix.
    #[must_use]
    pub fn encoded_size(&self) -> usize {
        OFFSET_WIDTH + self.value.len()
    }
}

impl From<Vec<u8>> for Record {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

impl From<&[u8]> for Record {
    fn from(value: &[u8]) -> Self {
        Self::new(value)
    }
}
