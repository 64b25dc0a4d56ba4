//! Request handlers.
//!
//! Store operations are synchronous file I/O, so every handler hands its
//! work to [`tokio::task::spawn_blocking`].

use crate::error::{ServerError, ServerResult};
use axum::extract::{FromRequest, Path, Query, Request, State};
use axum::http::StatusCode;
use axum::Json;
use rollcall_core::{
    Clock, CoreResult, Deleted, DocumentStore, Resources, Student, StudentDirectory, StudentForm,
    StudentReport,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared state for all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    resources: Resources,
    students: StudentDirectory,
}

impl AppState {
    /// Creates state over a store using the system clock.
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self::from_resources(Resources::new(store))
    }

    /// Creates state with an explicit time source.
    pub fn with_clock(store: Arc<DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self::from_resources(Resources::with_clock(store, clock))
    }

    fn from_resources(resources: Resources) -> Self {
        Self {
            students: StudentDirectory::new(resources.clone()),
            resources,
        }
    }

    /// Returns the generic resources.
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Returns the student directory.
    pub fn students(&self) -> &StudentDirectory {
        &self.students
    }
}

/// JSON body extractor whose rejection is a [`ServerError`], so malformed
/// bodies get the same `{ "error": ... }` shape as every other failure.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ServerError::InvalidRequest(rejection.body_text())),
        }
    }
}

/// Query for `GET /students`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    /// Search keyword.
    #[serde(default)]
    pub q: String,
}

/// Query for `GET /reports/students`.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// Filter keyword.
    #[serde(default)]
    pub keyword: String,
}

async fn blocking<T, F>(f: F) -> ServerResult<T>
where
    F: FnOnce() -> CoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Internal(format!("blocking task failed: {e}")))?
        .map_err(ServerError::from)
}

/// `GET /api/health`
pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// `GET /api/{collection}`
pub async fn list_records(
    State(state): State<AppState>,
    Path(collection): Path<String>,
) -> ServerResult<Json<Vec<Value>>> {
    let resources = state.resources.clone();
    let records = blocking(move || resources.list(&collection)).await?;
    Ok(Json(records))
}

/// `GET /api/{collection}/{id}`
pub async fn get_record(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> ServerResult<Json<Value>> {
    let resources = state.resources.clone();
    let record = blocking(move || resources.get(&collection, &id)).await?;
    Ok(Json(record))
}

/// `POST /api/{collection}`
pub async fn create_record(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    JsonBody(payload): JsonBody<Value>,
) -> ServerResult<(StatusCode, Json<Value>)> {
    let resources = state.resources.clone();
    let record = blocking(move || resources.create(&collection, &payload)).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `PATCH /api/{collection}/{id}`
pub async fn update_record(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    JsonBody(payload): JsonBody<Value>,
) -> ServerResult<Json<Value>> {
    let resources = state.resources.clone();
    let record = blocking(move || resources.update(&collection, &id, &payload)).await?;
    Ok(Json(record))
}

/// `DELETE /api/{collection}/{id}`
pub async fn delete_record(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> ServerResult<Json<Deleted>> {
    let resources = state.resources.clone();
    let deleted = blocking(move || resources.delete(&collection, &id)).await?;
    Ok(Json(deleted))
}

/// `GET /students?q=`
pub async fn search_students(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ServerResult<Json<Vec<Student>>> {
    let students = state.students.clone();
    let found = blocking(move || students.search(&query.q)).await?;
    Ok(Json(found))
}

/// `GET /students/{id}`
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<Json<Student>> {
    let students = state.students.clone();
    let student = blocking(move || students.get(&id)).await?;
    Ok(Json(student))
}

/// `POST /students`
pub async fn add_student(
    State(state): State<AppState>,
    JsonBody(form): JsonBody<StudentForm>,
) -> ServerResult<(StatusCode, Json<Student>)> {
    let students = state.students.clone();
    let student = blocking(move || students.add(&form)).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// `PUT /students/{id}`
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(form): JsonBody<StudentForm>,
) -> ServerResult<Json<Student>> {
    let students = state.students.clone();
    let student = blocking(move || students.update(&id, &form)).await?;
    Ok(Json(student))
}

/// `DELETE /students/{id}`
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<Json<Deleted>> {
    let students = state.students.clone();
    let deleted = blocking(move || students.delete(&id)).await?;
    Ok(Json(deleted))
}

/// `GET /reports/students?keyword=`
pub async fn student_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> ServerResult<Json<StudentReport>> {
    let students = state.students.clone();
    let report = blocking(move || StudentReport::build(&students, &query.keyword)).await?;
    Ok(Json(report))
}
