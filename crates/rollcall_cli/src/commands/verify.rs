//! Verify command implementation.

use super::open_read_only;
use crate::error::{CliError, CliResult};
use rollcall_core::{json_kind, Database, CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

/// Verification result.
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Number of collections checked.
    pub collections_checked: usize,
    /// Number of records checked.
    pub records_checked: usize,
    /// List of problems found.
    pub problems: Vec<String>,
    /// Findings that do not fail verification.
    pub warnings: Vec<String>,
}

impl VerifyResult {
    /// Returns true if no problems were found.
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Checks the structure of a parsed database.
///
/// Every collection must be an array of objects, each with a string `id`
/// that is unique within its collection. Non-string timestamps are only
/// warned about, since create stores caller-supplied values verbatim.
pub fn verify_database(database: &Database) -> VerifyResult {
    let mut result = VerifyResult::default();

    for (name, value) in database.iter() {
        result.collections_checked += 1;

        let Some(records) = value.as_array() else {
            result.problems.push(format!(
                "collection {name:?} is {} instead of an array",
                json_kind(value)
            ));
            continue;
        };

        let mut seen = HashSet::new();
        for (index, record) in records.iter().enumerate() {
            result.records_checked += 1;
            check_record(name, index, record, &mut seen, &mut result);
        }
    }

    result
}

fn check_record<'a>(
    collection: &str,
    index: usize,
    record: &'a Value,
    seen: &mut HashSet<&'a str>,
    result: &mut VerifyResult,
) {
    let problems = &mut result.problems;
    let Some(fields) = record.as_object() else {
        problems.push(format!(
            "{collection}[{index}] is {} instead of an object",
            json_kind(record)
        ));
        return;
    };

    match fields.get(ID_FIELD) {
        Some(Value::String(id)) => {
            if !seen.insert(id.as_str()) {
                problems.push(format!("{collection}[{index}] repeats id {id:?}"));
            }
        }
        Some(other) => problems.push(format!(
            "{collection}[{index}] has a {} id",
            json_kind(other)
        )),
        None => problems.push(format!("{collection}[{index}] has no id")),
    }

    for field in [CREATED_AT_FIELD, UPDATED_AT_FIELD] {
        if let Some(value) = fields.get(field) {
            if !value.is_string() {
                result.warnings.push(format!(
                    "{collection}[{index}] has a {} {field}",
                    json_kind(value)
                ));
            }
        }
    }
}

/// Runs the verify command.
pub fn run(path: &Path) -> CliResult<()> {
    println!("Verifying database at {}", path.display());
    println!();

    if !path.exists() {
        return Err(CliError::MissingDatabase(path.display().to_string()));
    }

    let database = open_read_only(path).read_database()?;
    let result = verify_database(&database);

    println!("Collections checked: {}", result.collections_checked);
    println!("Records checked: {}", result.records_checked);
    for problem in &result.problems {
        println!("  - {problem}");
    }
    for warning in &result.warnings {
        println!("  ! {warning}");
    }

    println!();
    if result.is_ok() {
        println!("✓ Database verification passed");
        Ok(())
    } else {
        println!("✗ Database verification failed");
        Err(CliError::VerificationFailed(result.problems.len()))
    }
}
