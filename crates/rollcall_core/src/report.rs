//! Student report.

use crate::error::CoreResult;
use crate::students::{Student, StudentDirectory};
use serde::{Deserialize, Serialize};

/// A filtered listing of students with a total.
///
/// Unlike [`StudentDirectory::search`], the keyword only matches name and
/// class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentReport {
    /// The trimmed keyword the report was built with.
    pub keyword: String,
    /// Number of students in the report.
    pub total: usize,
    /// Matching students ordered by name.
    pub students: Vec<Student>,
}

impl StudentReport {
    /// Builds a report. A blank keyword includes every student.
    pub fn build(directory: &StudentDirectory, keyword: &str) -> CoreResult<Self> {
        let keyword = keyword.trim().to_string();
        let students = directory.filter(&keyword, false)?;

        Ok(Self {
            total: students.len(),
            keyword,
            students,
        })
    }
}
