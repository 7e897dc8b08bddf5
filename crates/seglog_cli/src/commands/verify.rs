//! Read and decode every record in a log directory.

use seglog_core::{Config, Log};
use std::error::Error;
use std::path::Path;
use tracing::info;

pub fn run(path: &Path) -> Result<(), Box<dyn Error>> {
    let log = Log::open(path, Config::default())?;

    let lowest = log.lowest_offset()?;
    let Some(highest) = log.highest_offset()? else {
        log.close()?;
        println!("Log is empty: nothing to verify");
        return Ok(());
    };

    let mut checked = 0u64;
    let mut failures = 0u64;

    for offset in lowest..=highest {
        match log.read(offset) {
            Ok(record) => {
                if record.offset != offset {
                    failures += 1;
                    println!(
                        "offset {offset}: record carries mismatched offset {}",
                        record.offset
                    );
                }
            }
            Err(err) => {
                failures += 1;
                println!("offset {offset}: {err}");
            }
        }
        checked += 1;
    }

    log.close()?;
    info!(checked, failures, "verification finished");

    if failures == 0 {
        println!("OK: {checked} records verified");
        Ok(())
    } else {
        Err(format!("{failures} of {checked} records failed verification").into())
    }
}
