//! Remove segments whose records all fall below an offset.

use seglog_core::{Config, Log};
use std::error::Error;
use std::path::Path;
use tracing::info;

pub fn run(path: &Path, before: u64) -> Result<(), Box<dyn Error>> {
    let log = Log::open(path, Config::default())?;

    let segments_before = log.segments()?.len();
    log.truncate(before)?;
    let segments_after = log.segments()?.len();

    let lowest = log.lowest_offset()?;
    log.close()?;

    let removed = segments_before - segments_after;
    info!(removed, lowest, "truncate finished");
    println!("Removed {removed} segment(s); lowest offset is now {lowest}");

    Ok(())
}
