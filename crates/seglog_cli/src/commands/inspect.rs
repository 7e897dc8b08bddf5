//! Display segment layout and offset range.

use seglog_core::{Config, Log};
use std::error::Error;
use std::path::Path;

pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn Error>> {
    let log = Log::open(path, Config::default())?;

    let segments = log.segments()?;
    let lowest = log.lowest_offset()?;
    let highest = log.highest_offset()?;
    log.close()?;

    match format {
        "json" => {
            let value = serde_json::json!({
                "directory": path.display().to_string(),
                "lowest_offset": lowest,
                "highest_offset": highest,
                "segments": segments
                    .iter()
                    .map(|s| serde_json::json!({
                        "base_offset": s.base_offset,
                        "next_offset": s.next_offset,
                        "records": s.next_offset - s.base_offset,
                        "store_bytes": s.store_bytes,
                        "index_entries": s.index_entries,
                        "active": s.active,
                    }))
                    .collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        _ => {
            println!("Log directory: {}", path.display());
            match highest {
                Some(highest) => println!("Offsets: {lowest}..={highest}"),
                None => println!("Offsets: none (empty log)"),
            }
            println!();
            println!("{:<12} {:<12} {:<10} {:<12} {}", "base", "next", "records", "store bytes", "active");
            for segment in &segments {
                println!(
                    "{:<12} {:<12} {:<10} {:<12} {}",
                    segment.base_offset,
                    segment.next_offset,
                    segment.next_offset - segment.base_offset,
                    segment.store_bytes,
                    if segment.active { "yes" } else { "" }
                );
            }
        }
    }

    Ok(())
}
