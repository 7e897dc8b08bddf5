//! The log: an ordered collection of segments behind one directory.
//!
//! The log owns offset allocation, routes reads to the owning segment,
//! rolls over to a new segment when the active one fills up, and rebuilds
//! its segment list from the directory contents on open.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::record::Record;
use crate::segment::Segment;
use crate::traits::CommitLog;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// A snapshot of one segment's bookkeeping, for inspection tooling.
#[derive(Debug, Clone)]
pub struct SegmentInfo {
    /// Absolute offset of the segment's first record.
    pub base_offset: u64,
    /// Absolute offset the segment's next append would receive.
    pub next_offset: u64,
    /// Logical size of the segment's store in bytes.
    pub store_bytes: u64,
    /// Number of index entries in use.
    pub index_entries: u64,
    /// Whether this is the segment currently accepting appends.
    pub active: bool,
}

/// A segmented, append-only commit log over one directory.
///
/// All operations serialize on one internal mutex, so a `Log` can be shared
/// across threads. Offsets assigned by [`append`](Log::append) are strictly
/// monotonic and gap-free for the lifetime of the directory.
///
/// # Example
///
/// ```no_run
/// use seglog_core::{Config, Log, Record};
///
/// # fn main() -> seglog_core::CoreResult<()> {
/// let log = Log::open("/var/lib/seglog", Config::default())?;
///
/// let offset = log.append(Record::new(b"hello".as_slice()))?;
/// let record = log.read(offset)?;
/// assert_eq!(record.value, b"hello");
///
/// log.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Log {
    dir: PathBuf,
    config: Config,
    inner: Mutex<LogInner>,
}

#[derive(Debug)]
struct LogInner {
    /// Segments ordered by base offset, ascending. Non-empty while the log
    /// is open; the last element is the active segment.
    segments: Vec<Segment>,
    closed: bool,
}

impl LogInner {
    fn active(&self) -> &Segment {
        self.segments.last().expect("open log has segments")
    }

    fn active_mut(&mut self) -> &mut Segment {
        self.segments.last_mut().expect("open log has segments")
    }
}

impl Log {
    /// Opens a log over the given directory, creating it if needed.
    ///
    /// Existing segments are discovered from the `{base}.store` /
    /// `{base}.index` file names, deduplicated, and opened in ascending
    /// base-offset order. An empty directory gets one fresh segment at
    /// `config.segment.initial_offset`.
    pub fn open(dir: impl Into<PathBuf>, config: Config) -> CoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let inner = Self::setup(&dir, &config)?;

        Ok(Self {
            dir,
            config,
            inner: Mutex::new(inner),
        })
    }

    fn setup(dir: &Path, config: &Config) -> CoreResult<LogInner> {
        let mut segments = Vec::new();
        for base_offset in base_offsets(dir)? {
            segments.push(Segment::open(dir, base_offset, config.segment.clone())?);
        }

        if segments.is_empty() {
            segments.push(Segment::open(
                dir,
                config.segment.initial_offset,
                config.segment.clone(),
            )?);
        }

        Ok(LogInner {
            segments,
            closed: false,
        })
    }

    /// Appends a record and returns its assigned offset.
    ///
    /// Rolls over to a new segment (based at the active segment's next
    /// offset) once the active segment reaches either size threshold.
    pub fn append(&self, record: Record) -> CoreResult<u64> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(CoreError::Closed);
        }

        let mut record = record;
        let offset = match inner.active_mut().append(&mut record) {
            Ok(offset) => offset,
            // The index filled mid-append: the store already took the bytes,
            // which stay unreferenced. Roll over and retry once.
            Err(CoreError::IndexFull { .. }) => {
                self.roll_over(&mut inner)?;
                inner.active_mut().append(&mut record)?
            }
            Err(err) => return Err(err),
        };

        if inner.active().is_maxed() {
            self.roll_over(&mut inner)?;
        }

        Ok(offset)
    }

    fn roll_over(&self, inner: &mut LogInner) -> CoreResult<()> {
        let base_offset = inner.active().next_offset();
        inner
            .segments
            .push(Segment::open(&self.dir, base_offset, self.config.segment.clone())?);
        Ok(())
    }

    /// Reads the record at the given absolute offset.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::OffsetOutOfRange`] if no segment holds the
    /// offset.
    pub fn read(&self, offset: u64) -> CoreResult<Record> {
        let inner = self.inner.lock();
        if inner.closed {
            return Err(CoreError::Closed);
        }

        let idx = inner
            .segments
            .partition_point(|segment| segment.base_offset() <= offset);

        let segment = idx
            .checked_sub(1)
            .map(|i| &inner.segments[i])
            .filter(|segment| offset < segment.next_offset());

        match segment {
            Some(segment) => segment.read(offset),
            None => Err(CoreError::OffsetOutOfRange {
                offset,
                lowest: inner.segments[0].base_offset(),
                next: inner.active().next_offset(),
            }),
        }
    }

    /// Returns the lowest offset present in the log.
    pub fn lowest_offset(&self) -> CoreResult<u64> {
        let inner = self.inner.lock();
        if inner.closed {
            return Err(CoreError::Closed);
        }
        Ok(inner.segments[0].base_offset())
    }

    /// Returns the highest assigned offset, or `None` if the log holds no
    /// records yet.
    pub fn highest_offset(&self) -> CoreResult<Option<u64>> {
        let inner = self.inner.lock();
        if inner.closed {
            return Err(CoreError::Closed);
        }

        let next = inner.active().next_offset();
        if next == inner.segments[0].base_offset() {
            Ok(None)
        } else {
            Ok(Some(next - 1))
        }
    }

    /// Removes every segment whose highest offset is below `lowest`,
    /// reclaiming its disk space.
    ///
    /// The active segment is never removed, so the log always keeps at least
    /// one segment.
    pub fn truncate(&self, lowest: u64) -> CoreResult<()> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(CoreError::Closed);
        }

        while inner.segments.len() > 1 && inner.segments[0].next_offset() <= lowest {
            let mut segment = inner.segments.remove(0);
            segment.remove()?;
        }

        Ok(())
    }

    /// Returns a snapshot of every segment's bookkeeping, in base-offset
    /// order.
    pub fn segments(&self) -> CoreResult<Vec<SegmentInfo>> {
        let inner = self.inner.lock();
        if inner.closed {
            return Err(CoreError::Closed);
        }

        let last = inner.segments.len() - 1;
        Ok(inner
            .segments
            .iter()
            .enumerate()
            .map(|(i, segment)| SegmentInfo {
                base_offset: segment.base_offset(),
                next_offset: segment.next_offset(),
                store_bytes: segment.store_size(),
                index_entries: segment.index_entries(),
                active: i == last,
            })
            .collect())
    }

    /// Closes every segment in order.
    ///
    /// Closing truncates each index file back to its entries in use, which
    /// is what makes the next open cheap and exact. Calling `close` again is
    /// a no-op.
    pub fn close(&self) -> CoreResult<()> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Ok(());
        }

        for segment in &mut inner.segments {
            segment.close()?;
        }
        inner.closed = true;
        Ok(())
    }

    /// Closes the log and deletes its segment files.
    pub fn remove(&self) -> CoreResult<()> {
        let mut inner = self.inner.lock();
        for segment in &mut inner.segments {
            segment.remove()?;
        }
        inner.segments.clear();
        inner.closed = true;
        Ok(())
    }

    /// Removes the log's contents and re-opens it fresh over the same
    /// directory.
    pub fn reset(&self) -> CoreResult<()> {
        let mut inner = self.inner.lock();
        for segment in &mut inner.segments {
            segment.remove()?;
        }
        inner.segments.clear();

        *inner = Self::setup(&self.dir, &self.config)?;
        Ok(())
    }

    /// Returns the directory this log stores its segments in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Drop for Log {
    fn drop(&mut self) {
        // Best-effort close so index files are truncated even when the
        // caller forgets. Errors have nowhere to go here.
        let _ = self.close();
    }
}

impl CommitLog for Log {
    fn append(&self, record: Record) -> CoreResult<u64> {
        Log::append(self, record)
    }

    fn read(&self, offset: u64) -> CoreResult<Record> {
        Log::read(self, offset)
    }

    fn lowest_offset(&self) -> CoreResult<u64> {
        Log::lowest_offset(self)
    }

    fn highest_offset(&self) -> CoreResult<Option<u64>> {
        Log::highest_offset(self)
    }
}

/// Collects the base offsets present in a log directory.
///
/// Segment files are named `{base}.store` and `{base}.index`; the two
/// siblings dedupe to one base offset. File names that match neither
/// pattern are ignored.
fn base_offsets(dir: &Path) -> CoreResult<Vec<u64>> {
    let mut bases = BTreeSet::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        let is_segment_file = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("store") | Some("index")
        );
        if !is_segment_file {
            continue;
        }

        if let Some(base) = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.parse::<u64>().ok())
        {
            bases.insert(base);
        }
    }

    Ok(bases.into_iter().collect())
}
