//! Segment: one store file paired with one index file.
//!
//! The segment coordinates the two layers below it: an append writes the
//! record bytes to the store and the (relative offset, position) pair to the
//! index; a read resolves the index entry first and then fetches the bytes
//! from the store. The segment also owns the offset bookkeeping: its base
//! offset names the first record it can hold, and `next_offset` is the
//! absolute offset the next append will receive.

use crate::config::SegmentConfig;
use crate::error::{CoreError, CoreResult};
use crate::index::Index;
use crate::record::Record;
use crate::store::Store;
use std::fs;
use std::path::{Path, PathBuf};

/// A store+index pair covering one contiguous offset range of the log.
#[derive(Debug)]
pub struct Segment {
    store: Store,
    index: Index,
    store_path: PathBuf,
    index_path: PathBuf,
    base_offset: u64,
    next_offset: u64,
    config: SegmentConfig,
}

impl Segment {
    /// Opens or creates the segment with the given base offset in `dir`.
    ///
    /// The segment's files are `{base_offset}.store` and
    /// `{base_offset}.index`. `next_offset` is seeded from the last index
    /// entry, so a segment re-opened over existing data resumes at the
    /// offset after its last record.
    pub fn open(dir: &Path, base_offset: u64, config: SegmentConfig) -> CoreResult<Self> {
        let store_path = dir.join(format!("{base_offset}.store"));
        let index_path = dir.join(format!("{base_offset}.index"));

        let store = Store::open(&store_path)?;
        let index = Index::open(&index_path, config.max_index_bytes)?;

        let next_offset = match index.last_entry()? {
            Some(entry) => base_offset + u64::from(entry.relative_offset) + 1,
            None => base_offset,
        };

        Ok(Self {
            store,
            index,
            store_path,
            index_path,
            base_offset,
            next_offset,
            config,
        })
    }

    /// Appends a record, assigning it this segment's next offset.
    ///
    /// The record's `offset` field is overwritten with the assigned offset
    /// before encoding, so the stored bytes carry it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IndexFull`] when the index has no room for the
    /// entry. The record bytes are already in the store at that point and
    /// stay there unreferenced; the caller rolls over to a new segment.
    pub fn append(&mut self, record: &mut Record) -> CoreResult<u64> {
        let offset = self.next_offset;
        record.offset = offset;

        let (_, position) = self.store.append(&record.encode())?;

        self.index
            .write((offset - self.base_offset) as u32, position)?;
        self.next_offset += 1;

        if self.config.sync_on_append {
            self.store.sync()?;
        }

        Ok(offset)
    }

    /// Reads the record at the given absolute offset.
    pub fn read(&self, offset: u64) -> CoreResult<Record> {
        if offset < self.base_offset || offset >= self.next_offset {
            return Err(CoreError::OffsetOutOfRange {
                offset,
                lowest: self.base_offset,
                next: self.next_offset,
            });
        }

        let entry = self.index.entry(offset - self.base_offset)?;
        let data = self.store.read(entry.position)?;
        Record::decode(&data)
    }

    /// Returns whether the segment has reached either of its size limits.
    ///
    /// Both thresholds matter: many small records exhaust the index first,
    /// a few large records exhaust the store first.
    #[must_use]
    pub fn is_maxed(&self) -> bool {
        self.store.size() >= self.config.max_store_bytes
            || self.index.size() >= self.config.max_index_bytes
    }

    /// Returns the absolute offset of the first record this segment holds.
    #[must_use]
    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    /// Returns the absolute offset the next append will receive.
    #[must_use]
    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    /// Returns the logical size of the segment's store in bytes.
    #[must_use]
    pub fn store_size(&self) -> u64 {
        self.store.size()
    }

    /// Returns the number of index entries in use.
    #[must_use]
    pub fn index_entries(&self) -> u64 {
        self.index.entries()
    }

    /// Closes the index, then the store.
    ///
    /// The index goes first so its truncate-on-close completes before the
    /// store's final flush.
    pub fn close(&mut self) -> CoreResult<()> {
        self.index.close()?;
        self.store.close()?;
        Ok(())
    }

    /// Closes the segment and unlinks its files.
    pub fn remove(&mut self) -> CoreResult<()> {
        self.close()?;
        fs::remove_file(&self.index_path)?;
        fs::remove_file(&self.store_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ENT_WIDTH;
    use tempfile::tempdir;

    fn test_config() -> SegmentConfig {
        SegmentConfig {
            max_store_bytes: 1024,
            max_index_bytes: 1024,
            initial_offset: 0,
            sync_on_append: false,
        }
    }

    #[test]
    fn append_and_read() {
        let dir = tempdir().unwrap();
        let mut segment = Segment::open(dir.path(), 16, test_config()).unwrap();

        assert_eq!(segment.next_offset(), 16);

        let mut record = Record::new(b"hello world".as_slice());
        let offset = segment.append(&mut record).unwrap();
        assert_eq!(offset, 16);
        assert_eq!(record.offset, 16);

        let read = segment.read(16).unwrap();
        assert_eq!(read.value, b"hello world");
        assert_eq!(read.offset, 16);
    }

    #[test]
    fn offsets_are_consecutive() {
        let dir = tempdir().unwrap();
        let mut segment = Segment::open(dir.path(), 0, test_config()).unwrap();

        for want in 0..5 {
            let offset = segment.append(&mut Record::new(vec![want as u8])).unwrap();
            assert_eq!(offset, want);
        }
        assert_eq!(segment.next_offset(), 5);
    }

    #[test]
    fn read_out_of_range() {
        let dir = tempdir().unwrap();
        let mut segment = Segment::open(dir.path(), 10, test_config()).unwrap();
        segment.append(&mut Record::new(b"only".as_slice())).unwrap();

        assert!(matches!(
            segment.read(9),
            Err(CoreError::OffsetOutOfRange { .. })
        ));
        assert!(matches!(
            segment.read(11),
            Err(CoreError::OffsetOutOfRange { .. })
        ));
    }

    #[test]
    fn reopen_resumes_next_offset() {
        let dir = tempdir().unwrap();

        {
            let mut segment = Segment::open(dir.path(), 0, test_config()).unwrap();
            segment.append(&mut Record::new(b"a".as_slice())).unwrap();
            segment.append(&mut Record::new(b"b".as_slice())).unwrap();
            segment.close().unwrap();
        }

        let mut segment = Segment::open(dir.path(), 0, test_config()).unwrap();
        assert_eq!(segment.next_offset(), 2);
        assert_eq!(segment.read(0).unwrap().value, b"a");
        assert_eq!(segment.read(1).unwrap().value, b"b");

        let offset = segment.append(&mut Record::new(b"c".as_slice())).unwrap();
        assert_eq!(offset, 2);
    }

    #[test]
    fn maxed_by_index() {
        let dir = tempdir().unwrap();
        let config = SegmentConfig {
            max_index_bytes: ENT_WIDTH * 3,
            ..test_config()
        };
        let mut segment = Segment::open(dir.path(), 0, config).unwrap();

        for _ in 0..3 {
            assert!(!segment.is_maxed());
            segment.append(&mut Record::new(b"x".as_slice())).unwrap();
        }
        assert!(segment.is_maxed());
    }

    #[test]
    fn maxed_by_store() {
        let dir = tempdir().unwrap();
        let config = SegmentConfig {
            max_store_bytes: 32,
            ..test_config()
        };
        let mut segment = Segment::open(dir.path(), 0, config).unwrap();

        // Each empty-value record occupies 16 bytes: 8 length prefix plus
        // the 8-byte encoded offset.
        segment.append(&mut Record::default()).unwrap();
        assert!(!segment.is_maxed());
        segment.append(&mut Record::default()).unwrap();
        assert!(segment.is_maxed());
    }

    #[test]
    fn index_full_leaves_store_bytes_orphaned() {
        let dir = tempdir().unwrap();
        let config = SegmentConfig {
            max_index_bytes: ENT_WIDTH,
            ..test_config()
        };
        let mut segment = Segment::open(dir.path(), 0, config).unwrap();

        segment.append(&mut Record::new(b"fits".as_slice())).unwrap();

        let store_size_before = segment.store.size();
        let result = segment.append(&mut Record::new(b"rejected".as_slice()));
        assert!(matches!(result, Err(CoreError::IndexFull { .. })));

        // The store grew, the index did not, and next_offset is unchanged.
        assert!(segment.store.size() > store_size_before);
        assert_eq!(segment.index.entries(), 1);
        assert_eq!(segment.next_offset(), 1);
    }

    #[test]
    fn remove_unlinks_files() {
        let dir = tempdir().unwrap();
        let mut segment = Segment::open(dir.path(), 3, test_config()).unwrap();
        segment.append(&mut Record::new(b"gone".as_slice())).unwrap();

        let store_path = dir.path().join("3.store");
        let index_path = dir.path().join("3.index");
        assert!(store_path.exists());
        assert!(index_path.exists());

        segment.remove().unwrap();
        assert!(!store_path.exists());
        assert!(!index_path.exists());
    }
}
