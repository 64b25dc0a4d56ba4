//! Import command implementation.

use crate::error::{CliError, CliResult};
use rollcall_core::{Config, DocumentStore, Resources};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Appends every object in `records` to `collection` with the regular
/// create rules. Caller-supplied timestamps are kept; ids are regenerated.
///
/// All records are written in one cycle, so a failed write imports nothing.
/// Returns the number of records imported.
///
/// # Errors
///
/// Returns `InvalidImport` if `records` is not an array of objects. Nothing
/// is written in that case.
pub fn import_records(resources: &Resources, collection: &str, records: &Value) -> CliResult<usize> {
    let items = records
        .as_array()
        .ok_or_else(|| CliError::InvalidImport("expected a JSON array".to_string()))?;

    if let Some(index) = items.iter().position(|item| !item.is_object()) {
        return Err(CliError::InvalidImport(format!(
            "element {index} is not an object"
        )));
    }

    Ok(resources.create_many(collection, items)?.len())
}

/// Runs the import command.
///
/// The store honors `ROLLCALL_EXCLUSIVE_WRITES`, so an import takes the same
/// file lock as a server running in that mode.
pub fn run(path: &Path, collection: &str, file: &Path) -> CliResult<()> {
    let records: Value = serde_json::from_slice(&fs::read(file)?)?;

    let store = Arc::new(DocumentStore::open(Config::from_env().path(path)));
    let count = import_records(&Resources::new(store), collection, &records)?;

    tracing::info!(collection, count, "import finished");
    println!("Imported {count} record(s) into {collection}");
    Ok(())
}
