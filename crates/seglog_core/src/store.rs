//! Append-only record file with buffered writes.
//!
//! The store is the bottom layer of a segment: a single file holding
//! length-prefixed records. Appends go through a buffered writer; reads
//! flush the buffer first so they never observe a torn record.

use crate::error::{CoreError, CoreResult};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Width of the big-endian length prefix written before each record.
pub(crate) const LEN_WIDTH: u64 = 8;

/// An append-only, length-prefixed record file.
///
/// Every public operation serializes on one internal mutex. `size` tracks
/// the logical end of file, including bytes still sitting in the write
/// buffer and bytes written by previous processes.
#[derive(Debug)]
pub struct Store {
    inner: Mutex<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    // The file is opened in append mode, so reads may freely seek without
    // disturbing where buffered writes land.
    writer: BufWriter<File>,
    size: u64,
    closed: bool,
}

impl Store {
    /// Opens or creates a store file at the given path.
    ///
    /// The current file length seeds `size`, so a store re-opened over
    /// existing data continues where the previous process stopped. The file
    /// is never truncated.
    pub fn open(path: &Path) -> CoreResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        let size = file.metadata()?.len();

        Ok(Self {
            inner: Mutex::new(StoreInner {
                writer: BufWriter::new(file),
                size,
                closed: false,
            }),
        })
    }

    /// Appends a record payload to the store.
    ///
    /// Writes an 8-byte big-endian length prefix followed by the payload,
    /// both through the buffered writer. Returns the total bytes written and
    /// the position at which the record begins.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or a write fails. After a
    /// failed write `size` may no longer match the file; the store should
    /// not be used further.
    pub fn append(&self, data: &[u8]) -> CoreResult<(u64, u64)> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(CoreError::Closed);
        }

        let position = inner.size;

        inner.writer.write_all(&(data.len() as u64).to_be_bytes())?;
        inner.writer.write_all(data)?;

        let written = LEN_WIDTH + data.len() as u64;
        inner.size += written;

        Ok((written, position))
    }

    /// Reads the record stored at the given position.
    ///
    /// Flushes the write buffer first, in case the record has not reached
    /// the file yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed, the position is past the end
    /// of the file, or either read comes up short.
    pub fn read(&self, position: u64) -> CoreResult<Vec<u8>> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(CoreError::Closed);
        }

        inner.writer.flush()?;

        let file = inner.writer.get_mut();

        let mut len_buf = [0u8; LEN_WIDTH as usize];
        file.seek(SeekFrom::Start(position))?;
        file.read_exact(&mut len_buf)?;

        let len = u64::from_be_bytes(len_buf);
        let mut data = vec![0u8; len as usize];
        file.seek(SeekFrom::Start(position + LEN_WIDTH))?;
        file.read_exact(&mut data)?;

        Ok(data)
    }

    /// Reads raw bytes into `buf` starting at `offset` in the store file,
    /// flushing the write buffer first.
    ///
    /// Returns the number of bytes read, which is always `buf.len()` on
    /// success.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> CoreResult<usize> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(CoreError::Closed);
        }

        inner.writer.flush()?;

        let file = inner.writer.get_mut();
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)?;

        Ok(buf.len())
    }

    /// Flushes buffered writes and syncs the file to durable storage.
    pub fn sync(&self) -> CoreResult<()> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(CoreError::Closed);
        }

        inner.writer.flush()?;
        inner.writer.get_ref().sync_all()?;
        Ok(())
    }

    /// Returns the logical size of the store: flushed plus buffered bytes.
    pub fn size(&self) -> u64 {
        self.inner.lock().size
    }

    /// Flushes buffered writes and marks the store closed.
    ///
    /// Subsequent operations fail with [`CoreError::Closed`]. Calling
    /// `close` again is a no-op.
    pub fn close(&self) -> CoreResult<()> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Ok(());
        }

        inner.writer.flush()?;
        inner.writer.get_ref().sync_all()?;
        inner.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn append_and_read() {
        let dir = tempdir().unwrap();
        let store = Store::open(&dir.path().join("0.store")).unwrap();

        let (written, pos) = store.append(b"hello").unwrap();
        assert_eq!(written, LEN_WIDTH + 5);
        assert_eq!(pos, 0);

        let data = store.read(pos).unwrap();
        assert_eq!(&data, b"hello");
    }

    #[test]
    fn positions_advance_by_framed_size() {
        let dir = tempdir().unwrap();
        let store = Store::open(&dir.path().join("0.store")).unwrap();

        let (_, pos1) = store.append(b"one").unwrap();
        let (_, pos2) = store.append(b"three").unwrap();

        assert_eq!(pos1, 0);
        assert_eq!(pos2, LEN_WIDTH + 3);
        assert_eq!(store.size(), 2 * LEN_WIDTH + 3 + 5);

        assert_eq!(store.read(pos1).unwrap(), b"one");
        assert_eq!(store.read(pos2).unwrap(), b"three");
    }

    #[test]
    fn read_at_raw_bytes() {
        let dir = tempdir().unwrap();
        let store = Store::open(&dir.path().join("0.store")).unwrap();
        store.append(b"abc").unwrap();

        let mut buf = [0u8; 3];
        let n = store.read_at(&mut buf, LEN_WIDTH).unwrap();
        assert_eq!(n, 3);
        assert_eq!(&buf, b"abc");
    }

    #[test]
    fn reopen_recovers_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("0.store");

        let pos = {
            let store = Store::open(&path).unwrap();
            store.append(b"first").unwrap();
            let (_, pos) = store.append(b"second").unwrap();
            store.close().unwrap();
            pos
        };

        let store = Store::open(&path).unwrap();
        assert_eq!(store.size(), 2 * LEN_WIDTH + 5 + 6);
        assert_eq!(store.read(pos).unwrap(), b"second");

        // Appends continue past the recovered end.
        let (_, next_pos) = store.append(b"third").unwrap();
        assert_eq!(next_pos, 2 * LEN_WIDTH + 5 + 6);
    }

    #[test]
    fn read_past_end_fails() {
        let dir = tempdir().unwrap();
        let store = Store::open(&dir.path().join("0.store")).unwrap();
        store.append(b"x").unwrap();

        assert!(store.read(100).is_err());
    }

    #[test]
    fn close_is_idempotent_and_final() {
        let dir = tempdir().unwrap();
        let store = Store::open(&dir.path().join("0.store")).unwrap();
        store.append(b"data").unwrap();

        store.close().unwrap();
        store.close().unwrap();

        assert!(matches!(store.append(b"more"), Err(CoreError::Closed)));
        assert!(matches!(store.read(0), Err(CoreError::Closed)));
    }

    #[test]
    fn sync_flushes_to_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("0.store");
        let store = Store::open(&path).unwrap();

        store.append(b"durable").unwrap();
        store.sync().unwrap();

        // The buffered bytes must be visible to an independent reader.
        let on_disk = std::fs::read(&path).unwrap();
        assert_eq!(on_disk.len() as u64, store.size());
    }
}
