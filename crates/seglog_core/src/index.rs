//! Memory-mapped offset index.
//!
//! The index maps a record's offset (relative to the owning segment's base
//! offset) to its byte position in the store file. Entries are fixed-width,
//! so entry `n` always lives at byte `n * 12` and lookups are pure offset
//! arithmetic over the map.
//!
//! The file is grown to its maximum size before mapping because the map
//! cannot be resized afterwards. The unused tail is zeros while the index is
//! open; a clean close truncates the file back to the bytes actually in use
//! so the next open finds the true last entry at the end of the file.

use crate::error::{CoreError, CoreResult};
use memmap2::MmapMut;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Width of the relative offset field.
pub(crate) const REL_OFF_WIDTH: u64 = 4;
/// Width of the store position field.
pub(crate) const POS_WIDTH: u64 = 8;
/// Width of one index entry.
pub(crate) const ENT_WIDTH: u64 = REL_OFF_WIDTH + POS_WIDTH;

/// One entry of the index: a relative offset and the store position of the
/// record it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Offset relative to the segment's base offset. 32 bits, which caps a
    /// segment at 2^32 records.
    pub relative_offset: u32,
    /// Byte position of the record's length prefix in the store file.
    pub position: u64,
}

/// A fixed-width, memory-mapped offset→position table.
///
/// The index has no internal lock; access is serialized by the owning
/// segment and log.
#[derive(Debug)]
pub struct Index {
    file: File,
    /// `None` once the index is closed.
    mmap: Option<MmapMut>,
    /// Bytes of index in use; always a multiple of [`ENT_WIDTH`].
    size: u64,
}

impl Index {
    /// Opens or creates an index file and memory-maps it.
    ///
    /// The file is grown to `max_index_bytes` before mapping. If the
    /// existing file length equals `max_index_bytes`, the previous process
    /// did not close cleanly (or filled the index exactly); the entry count
    /// is then recovered by scanning backward past the zeroed tail.
    #[allow(unsafe_code)]
    pub fn open(path: &Path, max_index_bytes: u64) -> CoreResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let observed = file.metadata()?.len();

        // Grow to the final mapped size; the map cannot grow later.
        file.set_len(max_index_bytes)?;

        // SAFETY: the map is backed by a file this index exclusively owns,
        // and the file is not resized again while the map is live.
        let mmap = unsafe { MmapMut::map_mut(&file)? };

        let size = if observed == max_index_bytes {
            recovered_size(&mmap)
        } else {
            let in_range = observed.min(max_index_bytes);
            in_range - in_range % ENT_WIDTH
        };

        Ok(Self {
            file,
            mmap: Some(mmap),
            size,
        })
    }

    /// Appends an entry to the index.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IndexFull`] when the entry does not fit in the
    /// mapped region.
    pub fn write(&mut self, relative_offset: u32, position: u64) -> CoreResult<()> {
        let mmap = self.mmap.as_mut().ok_or(CoreError::Closed)?;

        if self.size + ENT_WIDTH > mmap.len() as u64 {
            return Err(CoreError::IndexFull {
                size: self.size,
                max_bytes: mmap.len() as u64,
            });
        }

        let at = self.size as usize;
        mmap[at..at + REL_OFF_WIDTH as usize].copy_from_slice(&relative_offset.to_be_bytes());
        mmap[at + REL_OFF_WIDTH as usize..at + ENT_WIDTH as usize]
            .copy_from_slice(&position.to_be_bytes());

        self.size += ENT_WIDTH;
        Ok(())
    }

    /// Reads entry `n` of the index.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IndexEntryOutOfBounds`] if fewer than `n + 1`
    /// entries are in use.
    pub fn entry(&self, n: u64) -> CoreResult<IndexEntry> {
        let mmap = self.mmap.as_ref().ok_or(CoreError::Closed)?;

        if (n + 1) * ENT_WIDTH > self.size {
            return Err(CoreError::IndexEntryOutOfBounds {
                entry: n,
                entries: self.entries(),
            });
        }

        let at = (n * ENT_WIDTH) as usize;
        let relative_offset = u32::from_be_bytes(
            mmap[at..at + REL_OFF_WIDTH as usize]
                .try_into()
                .expect("slice is exactly 4 bytes"),
        );
        let position = u64::from_be_bytes(
            mmap[at + REL_OFF_WIDTH as usize..at + ENT_WIDTH as usize]
                .try_into()
                .expect("slice is exactly 8 bytes"),
        );

        Ok(IndexEntry {
            relative_offset,
            position,
        })
    }

    /// Returns the last entry in use, or `None` if the index is empty.
    pub fn last_entry(&self) -> CoreResult<Option<IndexEntry>> {
        if self.size == 0 {
            return Ok(None);
        }
        self.entry(self.entries() - 1).map(Some)
    }

    /// Returns the number of bytes of index in use.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the number of entries in use.
    #[must_use]
    pub fn entries(&self) -> u64 {
        self.size / ENT_WIDTH
    }

    /// Syncs the map, truncates the file back to the bytes in use, and
    /// closes the index.
    ///
    /// The truncation is what lets the next open distinguish real entries
    /// from the zeroed tail. Calling `close` again is a no-op.
    pub fn close(&mut self) -> CoreResult<()> {
        let Some(mmap) = self.mmap.take() else {
            return Ok(());
        };

        mmap.flush_async()?;
        self.file.sync_all()?;
        // Unmap before shrinking the file underneath the mapping.
        drop(mmap);
        self.file.set_len(self.size)?;
        Ok(())
    }
}

/// Recovers the in-use size of an index whose file was never truncated by a
/// clean close: scan backward from the end, skipping all-zero entries.
///
/// A segment's first entry is legitimately all zeros (relative offset 0,
/// position 0), so a crash that persisted only that entry recovers as empty;
/// the next append reassigns the same offset and the store bytes become
/// unreferenced.
fn recovered_size(mmap: &MmapMut) -> u64 {
    let total = mmap.len() as u64 / ENT_WIDTH;
    for n in (0..total).rev() {
        let at = (n * ENT_WIDTH) as usize;
        if mmap[at..at + ENT_WIDTH as usize].iter().any(|&b| b != 0) {
            return (n + 1) * ENT_WIDTH;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    const MAX: u64 = 12 * 4;

    #[test]
    fn write_and_read_entries() {
        let dir = tempdir().unwrap();
        let mut index = Index::open(&dir.path().join("0.index"), MAX).unwrap();

        assert_eq!(index.last_entry().unwrap(), None);

        index.write(0, 0).unwrap();
        index.write(1, 21).unwrap();
        index.write(2, 42).unwrap();

        assert_eq!(index.entries(), 3);
        assert_eq!(
            index.entry(1).unwrap(),
            IndexEntry {
                relative_offset: 1,
                position: 21
            }
        );
        assert_eq!(
            index.last_entry().unwrap(),
            Some(IndexEntry {
                relative_offset: 2,
                position: 42
            })
        );
    }

    #[test]
    fn entry_out_of_bounds() {
        let dir = tempdir().unwrap();
        let mut index = Index::open(&dir.path().join("0.index"), MAX).unwrap();
        index.write(0, 0).unwrap();

        assert!(matches!(
            index.entry(1),
            Err(CoreError::IndexEntryOutOfBounds { .. })
        ));
    }

    #[test]
    fn rejects_writes_when_full() {
        let dir = tempdir().unwrap();
        let mut index = Index::open(&dir.path().join("0.index"), ENT_WIDTH * 2).unwrap();

        index.write(0, 0).unwrap();
        index.write(1, 16).unwrap();

        assert!(matches!(
            index.write(2, 32),
            Err(CoreError::IndexFull { .. })
        ));
    }

    #[test]
    fn close_truncates_to_entries_in_use() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("0.index");

        let mut index = Index::open(&path, MAX).unwrap();
        index.write(0, 0).unwrap();
        index.write(1, 16).unwrap();
        index.close().unwrap();

        assert_eq!(std::fs::metadata(&path).unwrap().len(), 2 * ENT_WIDTH);
    }

    #[test]
    fn reopen_after_clean_close() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("0.index");

        {
            let mut index = Index::open(&path, MAX).unwrap();
            // First entry of a segment: both fields zero.
            index.write(0, 0).unwrap();
            index.write(1, 16).unwrap();
            index.close().unwrap();
        }

        let index = Index::open(&path, MAX).unwrap();
        assert_eq!(index.entries(), 2);
        assert_eq!(
            index.last_entry().unwrap(),
            Some(IndexEntry {
                relative_offset: 1,
                position: 16
            })
        );
    }

    #[test]
    fn reopen_single_zero_entry_after_clean_close() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("0.index");

        {
            let mut index = Index::open(&path, MAX).unwrap();
            index.write(0, 0).unwrap();
            index.close().unwrap();
        }

        // The file was truncated to 12 bytes, so the all-zero entry is not
        // mistaken for padding.
        let index = Index::open(&path, MAX).unwrap();
        assert_eq!(index.entries(), 1);
    }

    #[test]
    fn recovers_from_unclean_shutdown() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("0.index");

        // Simulate a crash: the file sits at its pre-grown length with two
        // real entries followed by a zeroed tail.
        {
            let mut file = File::create(&path).unwrap();
            file.write_all(&0u32.to_be_bytes()).unwrap();
            file.write_all(&0u64.to_be_bytes()).unwrap();
            file.write_all(&1u32.to_be_bytes()).unwrap();
            file.write_all(&16u64.to_be_bytes()).unwrap();
            file.set_len(MAX).unwrap();
        }

        let index = Index::open(&path, MAX).unwrap();
        assert_eq!(index.entries(), 2);
        assert_eq!(
            index.last_entry().unwrap(),
            Some(IndexEntry {
                relative_offset: 1,
                position: 16
            })
        );
    }

    #[test]
    fn recovers_empty_from_all_zero_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("0.index");

        {
            let file = File::create(&path).unwrap();
            file.set_len(MAX).unwrap();
        }

        let index = Index::open(&path, MAX).unwrap();
        assert_eq!(index.entries(), 0);
        assert_eq!(index.last_entry().unwrap(), None);
    }

    #[test]
    fn full_index_survives_clean_close() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("0.index");
        let max = ENT_WIDTH * 3;

        {
            let mut index = Index::open(&path, max).unwrap();
            index.write(0, 0).unwrap();
            index.write(1, 16).unwrap();
            index.write(2, 32).unwrap();
            index.close().unwrap();
        }

        // Length equals the pre-grown size, but every entry is real; the
        // backward scan must keep all of them.
        let index = Index::open(&path, max).unwrap();
        assert_eq!(index.entries(), 3);
    }

    #[test]
    fn close_is_idempotent_and_final() {
        let dir = tempdir().unwrap();
        let mut index = Index::open(&dir.path().join("0.index"), MAX).unwrap();

        index.write(0, 0).unwrap();
        index.close().unwrap();
        index.close().unwrap();

        assert!(matches!(index.write(1, 16), Err(CoreError::Closed)));
        assert!(matches!(index.entry(0), Err(CoreError::Closed)));
    }
}
