//! Print records from a log directory.

use seglog_core::{Config, CoreError, Log};
use std::error::Error;
use std::path::Path;

pub fn run(
    path: &Path,
    offset: Option<u64>,
    limit: Option<usize>,
    format: &str,
) -> Result<(), Box<dyn Error>> {
    let log = Log::open(path, Config::default())?;

    let mut offset = match offset {
        Some(offset) => offset,
        None => log.lowest_offset()?,
    };
    let limit = limit.unwrap_or(usize::MAX);

    let mut printed = 0usize;
    while printed < limit {
        let record = match log.read(offset) {
            Ok(record) => record,
            Err(CoreError::OffsetOutOfRange { .. }) => break,
            Err(err) => return Err(err.into()),
        };

        match format {
            "json" => {
                let value = serde_json::json!({
                    "offset": record.offset,
                    "value": record.value,
                });
                println!("{value}");
            }
            _ => match std::str::from_utf8(&record.value) {
                Ok(text) => println!("{:>8}  {text}", record.offset),
                Err(_) => println!("{:>8}  <{} bytes>", record.offset, record.value.len()),
            },
        }

        printed += 1;
        offset += 1;
    }

    log.close()?;
    Ok(())
}
