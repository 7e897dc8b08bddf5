//! The capability trait the service layer depends on.

use crate::error::CoreResult;
use crate::record::Record;

/// An offset-addressed record log.
///
/// This is the seam between the storage core and anything that marshals
/// produce/consume calls into it: an HTTP transport, an RPC transport, or an
/// in-memory double in tests all program against this trait.
///
/// # Invariants
///
/// - `append` assigns strictly monotonic, gap-free offsets, overwriting any
///   offset carried by the incoming record
/// - `read` returns exactly the record previously appended at that offset
/// - `highest_offset` is `None` until the first append
/// - Implementations must be `Send + Sync`; callers may invoke from any
///   thread
///
/// # Implementors
///
/// - [`crate::Log`] - the durable, segmented log
/// - [`crate::InMemoryLog`] - for testing
pub trait CommitLog: Send + Sync {
    /// Appends a record, returning the offset assigned to it.
    fn append(&self, record: Record) -> CoreResult<u64>;

    /// Reads the record at the given offset.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::OffsetOutOfRange`] if the offset is below
    /// the lowest or above the highest offset present.
    fn read(&self, offset: u64) -> CoreResult<Record>;

    /// Returns the lowest offset present.
    fn lowest_offset(&self) -> CoreResult<u64>;

    /// Returns the highest assigned offset, or `None` when no records have
    /// been appended yet.
    fn highest_offset(&self) -> CoreResult<Option<u64>>;
}
