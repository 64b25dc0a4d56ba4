//! Dump command implementation.

use super::open_read_only;
use crate::error::CliResult;
use serde_json::Value;
use std::path::Path;

/// Returns a collection's records. A missing collection is empty.
pub fn collect(path: &Path, collection: &str) -> CliResult<Vec<Value>> {
    Ok(open_read_only(path).get_collection(collection)?.into_records())
}

/// Runs the dump command.
pub fn run(path: &Path, collection: &str, pretty: bool) -> CliResult<()> {
    let records = collect(path, collection)?;
    tracing::debug!(collection, count = records.len(), "dumping collection");

    let output = if pretty {
        serde_json::to_string_pretty(&records)?
    } else {
        serde_json::to_string(&records)?
    };
    println!("{output}");

    Ok(())
}
