//! Benchmark utilities.

use rollcall_core::Resources;
use serde_json::{json, Value};

/// Builds a student-shaped payload numbered `i`.
pub fn student_payload(i: usize) -> Value {
    json!({
        "name": format!("Student {i}"),
        "class": format!("{}A", i % 12 + 1),
        "email": format!("student{i}@example.com"),
    })
}

/// Builds a JSON document of roughly `size` bytes.
pub fn json_document(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size + 16);
    data.extend_from_slice(b"{\"blob\": \"");
    data.extend((0..size).map(|i| b'a' + (i % 26) as u8));
    data.extend_from_slice(b"\"}");
    data
}

/// Creates `count` student records in `collection`.
///
/// # Panics
///
/// Panics if a create fails.
#[allow(clippy::expect_used)]
pub fn populate(resources: &Resources, collection: &str, count: usize) {
    for i in 0..count {
        resources
            .create(collection, &student_payload(i))
            .expect("populate benchmark store");
    }
}
