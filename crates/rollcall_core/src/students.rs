//! Student directory.
//!
//! A typed view over the `students` collection. Records are created and
//! merged through [`Resources`], so they carry the usual `id`, `createdAt`
//! and `updatedAt` fields. Student names are unique, compared without
//! regard to case.

use crate::error::{CoreError, CoreResult};
use crate::record::{record_id, CREATED_AT_FIELD, UPDATED_AT_FIELD};
use crate::resource::{Deleted, Resources};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Collection holding student records.
pub const STUDENTS_COLLECTION: &str = "students";

/// A student as stored in the directory.
///
/// Extra fields present in the stored record are kept on disk but not
/// exposed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Record id.
    pub id: String,
    /// Full name, unique case-insensitively.
    #[serde(default)]
    pub name: String,
    /// Class label, e.g. `XII IPA 1`.
    #[serde(default)]
    pub class: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last modification timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Student {
    /// Reads a stored record leniently.
    ///
    /// The collection is shared with the generic routes, which accept any
    /// object. Scalar fields are rendered as text and anything else reads as
    /// empty. Only a record without a string `id` is unusable.
    fn from_record(record: &Value) -> Option<Self> {
        Some(Self {
            id: record_id(record)?.to_string(),
            name: text_field(record, "name").unwrap_or_default(),
            class: text_field(record, "class").unwrap_or_default(),
            email: text_field(record, "email").unwrap_or_default(),
            created_at: text_field(record, CREATED_AT_FIELD),
            updated_at: text_field(record, UPDATED_AT_FIELD),
        })
    }

    fn from_stored(record: &Value) -> CoreResult<Self> {
        Self::from_record(record)
            .ok_or_else(|| CoreError::invalid_format("student record has no string id"))
    }

    fn matches(&self, needle: &str, include_email: bool) -> bool {
        contains_ignore_case(&self.name, needle)
            || contains_ignore_case(&self.class, needle)
            || (include_email && contains_ignore_case(&self.email, needle))
    }
}

/// Input for adding or editing a student.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentForm {
    /// Full name.
    #[serde(default)]
    pub name: String,
    /// Class label.
    #[serde(default)]
    pub class: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
}

impl StudentForm {
    /// Creates a form.
    pub fn new(
        name: impl Into<String>,
        class: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            email: email.into(),
        }
    }

    /// Trims every field and checks that none is empty.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if any field is blank.
    pub fn validate(&self) -> CoreResult<Self> {
        let form = Self::new(self.name.trim(), self.class.trim(), self.email.trim());
        if form.name.is_empty() || form.class.is_empty() || form.email.is_empty() {
            return Err(CoreError::validation("Name, class and email are required"));
        }
        Ok(form)
    }

    fn to_payload(&self) -> Value {
        json!({ "name": self.name, "class": self.class, "email": self.email })
    }
}

/// Operations on the `students` collection.
#[derive(Debug, Clone)]
pub struct StudentDirectory {
    resources: Resources,
}

impl StudentDirectory {
    /// Creates a directory over `resources`.
    #[must_use]
    pub fn new(resources: Resources) -> Self {
        Self { resources }
    }

    /// Returns the underlying resources.
    #[must_use]
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Returns every student ordered by name, ignoring case.
    pub fn list(&self) -> CoreResult<Vec<Student>> {
        let mut students = self
            .resources
            .list(STUDENTS_COLLECTION)?
            .iter()
            .filter_map(|record| {
                let student = Student::from_record(record);
                if student.is_none() {
                    tracing::warn!("skipping student record without a string id");
                }
                student
            })
            .collect::<Vec<_>>();
        sort_by_name(&mut students);
        Ok(students)
    }

    /// Returns one student.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is no such student.
    pub fn get(&self, id: &str) -> CoreResult<Student> {
        Student::from_stored(&self.resources.get(STUDENTS_COLLECTION, id)?)
    }

    /// Adds a student.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank field and `Duplicate` if another
    /// student already has the same name ignoring case.
    pub fn add(&self, form: &StudentForm) -> CoreResult<Student> {
        let form = form.validate()?;

        let record = self.resources.create_checked(
            STUDENTS_COLLECTION,
            &form.to_payload(),
            |records| ensure_name_free(records, &form.name, None),
        )?;

        tracing::info!(name = %form.name, "added student");
        Student::from_stored(&record)
    }

    /// Replaces a student's name, class and email.
    ///
    /// The duplicate check only runs when the name changes.
    ///
    /// # Errors
    ///
    /// Returns `Validation`, `NotFound`, or `Duplicate` if the new name is
    /// taken by another student.
    pub fn update(&self, id: &str, form: &StudentForm) -> CoreResult<Student> {
        let form = form.validate()?;

        let record = self.resources.update_checked(
            STUDENTS_COLLECTION,
            id,
            &form.to_payload(),
            |records, index| {
                let current = record_name(&records[index]);
                if current.to_lowercase() == form.name.to_lowercase() {
                    return Ok(());
                }
                ensure_name_free(records, &form.name, Some(index))
            },
        )?;

        Student::from_stored(&record)
    }

    /// Removes a student.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is no such student.
    pub fn delete(&self, id: &str) -> CoreResult<Deleted> {
        self.resources.delete(STUDENTS_COLLECTION, id)
    }

    /// Returns students whose name, class or email contains `keyword`,
    /// ignoring case. A blank keyword returns everyone.
    pub fn search(&self, keyword: &str) -> CoreResult<Vec<Student>> {
        self.filter(keyword, true)
    }

    /// Same as [`StudentDirectory::search`], optionally leaving email out
    /// of the match.
    pub(crate) fn filter(&self, keyword: &str, include_email: bool) -> CoreResult<Vec<Student>> {
        let students = self.list()?;
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(students);
        }

        Ok(students
            .into_iter()
            .filter(|student| student.matches(&needle, include_email))
            .collect())
    }
}

fn text_field(record: &Value, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn record_name(record: &Value) -> &str {
    record.get("name").and_then(Value::as_str).unwrap_or_default()
}

fn ensure_name_free(records: &[Value], name: &str, skip: Option<usize>) -> CoreResult<()> {
    let wanted = name.to_lowercase();
    let taken = records
        .iter()
        .enumerate()
        .filter(|(index, _)| Some(*index) != skip)
        .any(|(_, record)| record_name(record).to_lowercase() == wanted);

    if taken {
        return Err(CoreError::duplicate(format!(
            "Student name '{name}' is already in use"
        )));
    }
    Ok(())
}

fn sort_by_name(students: &mut [Student]) {
    students.sort_by_cached_key(|student| student.name.to_lowercase());
}

/// `needle` must already be lowercase.
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::DocumentStore;
    use std::sync::Arc;

    fn directory() -> StudentDirectory {
        let store = Arc::new(DocumentStore::open_in_memory());
        let clock = Arc::new(FixedClock::new("2024-03-01T07:00:00.000Z"));
        StudentDirectory::new(Resources::with_clock(store, clock))
    }

    fn seeded() -> StudentDirectory {
        let dir = directory();
        dir.add(&StudentForm::new("Citra Lestari", "X-1", "citra.l@email.com"))
            .unwrap();
        dir.add(&StudentForm::new("ahmad Subagja", "XII IPA 1", "ahmad.s@email.com"))
            .unwrap();
        dir.add(&StudentForm::new("Budi Santoso", "XI IPS 3", "budi.s@email.com"))
            .unwrap();
        dir
    }

    fn names(students: &[Student]) -> Vec<&str> {
        students.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn add_trims_and_stamps() {
        let dir = directory();
        let student = dir
            .add(&StudentForm::new("  Ada  ", " X-1 ", " ada@example.com "))
            .unwrap();

        assert_eq!(student.name, "Ada");
        assert_eq!(student.class, "X-1");
        assert_eq!(student.email, "ada@example.com");
        assert_eq!(student.created_at.as_deref(), Some("2024-03-01T07:00:00.000Z"));
        assert_eq!(dir.get(&student.id).unwrap(), student);
    }

    #[test]
    fn add_requires_all_fields() {
        let dir = directory();
        let err = dir.add(&StudentForm::new("Ada", "  ", "ada@example.com")).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
        assert!(dir.list().unwrap().is_empty());
    }

    #[test]
    fn add_rejects_duplicate_name_ignoring_case() {
        let dir = seeded();
        let err = dir
            .add(&StudentForm::new("BUDI SANTOSO", "X-2", "other@email.com"))
            .unwrap_err();
        assert!(matches!(err, CoreError::Duplicate { .. }));
        assert_eq!(dir.list().unwrap().len(), 3);
    }

    #[test]
    fn list_sorts_by_name_ignoring_case() {
        let dir = seeded();
        assert_eq!(
            names(&dir.list().unwrap()),
            vec!["ahmad Subagja", "Budi Santoso", "Citra Lestari"]
        );
    }

    #[test]
    fn update_keeps_name_case_change() {
        let dir = seeded();
        let budi = dir.search("budi").unwrap().remove(0);

        let updated = dir
            .update(&budi.id, &StudentForm::new("BUDI santoso", "XII IPS 1", "b@email.com"))
            .unwrap();
        assert_eq!(updated.id, budi.id);
        assert_eq!(updated.name, "BUDI santoso");
        assert_eq!(updated.class, "XII IPS 1");
        assert_eq!(updated.created_at, budi.created_at);
    }

    #[test]
    fn update_rejects_rename_to_taken_name() {
        let dir = seeded();
        let budi = dir.search("budi").unwrap().remove(0);

        let err = dir
            .update(&budi.id, &StudentForm::new("citra lestari", "X-1", "b@email.com"))
            .unwrap_err();
        assert!(matches!(err, CoreError::Duplicate { .. }));
        assert_eq!(dir.get(&budi.id).unwrap().name, "Budi Santoso");
    }

    #[test]
    fn update_and_delete_missing() {
        let dir = seeded();
        let form = StudentForm::new("Dewi", "X-3", "dewi@email.com");
        assert!(matches!(dir.update("nope", &form), Err(CoreError::NotFound { .. })));
        assert!(matches!(dir.delete("nope"), Err(CoreError::NotFound { .. })));
    }

    #[test]
    fn delete_student() {
        let dir = seeded();
        let citra = dir.search("citra").unwrap().remove(0);

        let deleted = dir.delete(&citra.id).unwrap();
        assert_eq!(deleted.deleted, citra.id);
        assert_eq!(dir.list().unwrap().len(), 2);
    }

    #[test]
    fn search_matches_name_class_and_email() {
        let dir = seeded();
        assert_eq!(names(&dir.search("  SANTOSO ").unwrap()), vec!["Budi Santoso"]);
        assert_eq!(names(&dir.search("ipa").unwrap()), vec!["ahmad Subagja"]);
        assert_eq!(names(&dir.search("citra.l@").unwrap()), vec!["Citra Lestari"]);
        assert_eq!(dir.search("").unwrap().len(), 3);
        assert!(dir.search("zzz").unwrap().is_empty());
    }

    #[test]
    fn search_treats_wildcards_literally() {
        let dir = seeded();
        dir.add(&StudentForm::new("Eka_100%", "X-1", "eka@email.com")).unwrap();

        assert_eq!(names(&dir.search("_100%").unwrap()), vec!["Eka_100%"]);
        assert!(dir.search("%").unwrap().len() == 1);
    }

    #[test]
    fn generic_records_with_odd_fields_still_list() {
        let dir = seeded();
        dir.resources()
            .create(STUDENTS_COLLECTION, &json!({"name": 42, "class": ["X"], "email": null}))
            .unwrap();
        dir.resources()
            .create(STUDENTS_COLLECTION, &json!({"nickname": "no name"}))
            .unwrap();

        let students = dir.list().unwrap();
        assert_eq!(students.len(), 5);
        assert_eq!(names(&students), vec!["", "42", "ahmad Subagja", "Budi Santoso", "Citra Lestari"]);

        let odd = students.iter().find(|s| s.name == "42").unwrap();
        assert_eq!(odd.class, "");
        assert_eq!(dir.get(&odd.id).unwrap().name, "42");
        assert_eq!(names(&dir.search("42").unwrap()), vec!["42"]);
    }

    #[test]
    fn records_without_id_are_skipped() {
        let store = Arc::new(DocumentStore::open_in_memory());
        store
            .transact_collection(STUDENTS_COLLECTION, |students| {
                students.push(json!({"name": "Hand Edited"}));
                students.push(json!({"id": "s1", "name": "Ada"}));
                Ok(crate::store::Outcome::Commit(()))
            })
            .unwrap();

        let dir = StudentDirectory::new(Resources::new(store));
        assert_eq!(names(&dir.list().unwrap()), vec!["Ada"]);
    }

    #[test]
    fn extra_fields_survive_directory_update() {
        let dir = seeded();
        let budi = dir.search("budi").unwrap().remove(0);
        dir.resources()
            .update(STUDENTS_COLLECTION, &budi.id, &json!({"nis": "2024-001"}))
            .unwrap();

        dir.update(&budi.id, &StudentForm::new("Budi Santoso", "XI IPS 3", "b@email.com"))
            .unwrap();

        let raw = dir.resources().get(STUDENTS_COLLECTION, &budi.id).unwrap();
        assert_eq!(raw["nis"], "2024-001");
    }
}
