//! # SegLog Core
//!
//! The core of a segmented, append-only commit log: a durable,
//! offset-addressed record store.
//!
//! The core is a four-layer stack, each layer depending only on those below:
//!
//! - [`Store`] - buffered append of length-prefixed records to one file,
//!   positional read
//! - [`Index`] - memory-mapped fixed-width (relative offset, position) table
//! - [`Segment`] - one store paired with one index under a base offset
//! - [`Log`] - ordered segments, offset allocation, rollover, restart
//!   recovery
//!
//! Transports program against the [`CommitLog`] trait rather than the
//! concrete [`Log`], so the same service code can run over the durable log
//! or the [`InMemoryLog`] double.
//!
//! ## Example
//!
//! ```rust
//! use seglog_core::{CommitLog, InMemoryLog, Record};
//!
//! let log = InMemoryLog::new();
//! let offset = log.append(Record::new(b"hello".as_slice())).unwrap();
//! assert_eq!(log.read(offset).unwrap().value, b"hello");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod index;
pub mod log;
pub mod memory;
pub mod record;
pub mod segment;
pub mod store;
pub mod traits;

pub use config::{Config, SegmentConfig};
pub use error::{CoreError, CoreResult};
pub use index::{Index, IndexEntry};
pub use log::{Log, SegmentInfo};
pub use memory::InMemoryLog;
pub use record::Record;
pub use segment::Segment;
pub use store::Store;
pub use traits::CommitLog;

/// Current version of the core crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
