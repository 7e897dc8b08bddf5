//! In-memory log for testing.

use crate::error::{CoreError, CoreResult};
use crate::record::Record;
use crate::traits::CommitLog;
use parking_lot::Mutex;

/// A [`CommitLog`] backed by a `Vec`, for tests and ephemeral use.
///
/// Offsets behave exactly like the durable log's: assigned at append,
/// starting at the configured base, gap-free. Nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemoryLog {
    inner: Mutex<Vec<Record>>,
    base_offset: u64,
}

impl InMemoryLog {
    /// Creates an empty in-memory log starting at offset 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty in-memory log whose first record takes the given
    /// offset.
    #[must_use]
    pub fn with_base_offset(base_offset: u64) -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
            base_offset,
        }
    }

    /// Returns the number of records held.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns whether the log holds no records.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl CommitLog for InMemoryLog {
    fn append(&self, mut record: Record) -> CoreResult<u64> {
        let mut records = self.inner.lock();
        let offset = self.base_offset + records.len() as u64;
        record.offset = offset;
        records.push(record);
        Ok(offset)
    }

    fn read(&self, offset: u64) -> CoreResult<Record> {
        let records = self.inner.lock();

        offset
            .checked_sub(self.base_offset)
            .and_then(|i| records.get(i as usize))
            .cloned()
            .ok_or(CoreError::OffsetOutOfRange {
                offset,
                lowest: self.base_offset,
                next: self.base_offset + records.len() as u64,
            })
    }

    fn lowest_offset(&self) -> CoreResult<u64> {
        Ok(self.base_offset)
    }

    fn highest_offset(&self) -> CoreResult<Option<u64>> {
        let records = self.inner.lock();
        Ok((!records.is_empty()).then(|| self.base_offset + records.len() as u64 - 1))
    }
}
