//! Inspect command implementation.

use super::open_read_only;
use crate::error::{CliError, CliResult};
use rollcall_core::json_kind;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Database inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Database path.
    pub path: String,
    /// File size in bytes.
    pub size: u64,
    /// Total records across array collections.
    pub total_records: usize,
    /// Per-collection statistics in stored order.
    pub collections: Vec<CollectionStats>,
}

/// Statistics for a single collection.
#[derive(Debug, Serialize)]
pub struct CollectionStats {
    /// Collection name.
    pub name: String,
    /// Number of records, or `None` if the value is not an array.
    pub records: Option<usize>,
    /// JSON type of the stored value.
    pub kind: &'static str,
}

/// Collects statistics without modifying the file.
///
/// # Errors
///
/// Returns `MissingDatabase` if the file does not exist, or a store error
/// if it cannot be parsed.
pub fn inspect(path: &Path) -> CliResult<InspectResult> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CliError::MissingDatabase(path.display().to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let database = open_read_only(path).read_database()?;
    let collections: Vec<CollectionStats> = database
        .iter()
        .map(|(name, value)| CollectionStats {
            name: name.to_string(),
            records: value.as_array().map(Vec::len),
            kind: json_kind(value),
        })
        .collect();

    Ok(InspectResult {
        path: path.display().to_string(),
        size: metadata.len(),
        total_records: collections.iter().filter_map(|c| c.records).sum(),
        collections,
    })
}

/// Runs the inspect command.
pub fn run(path: &Path, json: bool) -> CliResult<()> {
    let result = inspect(path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_text_output(&result);
    }

    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("Database: {}", result.path);
    println!("Size: {} bytes", result.size);
    println!("Collections: {}", result.collections.len());
    println!("Records: {}", result.total_records);

    if !result.collections.is_empty() {
        println!();
        println!("{:<32} {:>10}", "COLLECTION", "RECORDS");
        for collection in &result.collections {
            match collection.records {
                Some(count) => println!("{:<32} {:>10}", collection.name, count),
                None => println!("{:<32} {:>10}", collection.name, collection.kind),
            }
        }
    }
}
