use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use service_core::extract::ValidatedJson;

use crate::dtos::{CreateStudentRequest, MessageResponse, StudentResponse, UpdateStudentRequest};
use crate::services::{record_operation, StoreError};
use crate::startup::AppState;

const NOT_FOUND: &str = "Student not found";

/// Underlying error text, or the operation's fallback when it has none.
fn message_or(err: &StoreError, fallback: &str) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

/// Create and update reject every store failure as a bad request.
fn rejected(operation: &'static str, err: StoreError, fallback: &str) -> AppError {
    record_operation(operation, "rejected");
    AppError::BadRequest(anyhow::anyhow!(message_or(&err, fallback)))
}

/// Reads and deletes surface store failures as server errors.
fn failed(operation: &'static str, err: StoreError, fallback: &str) -> AppError {
    record_operation(operation, "failed");
    AppError::DatabaseError(anyhow::anyhow!(message_or(&err, fallback)))
}

fn not_found(operation: &'static str) -> AppError {
    record_operation(operation, "not_found");
    AppError::NotFound(anyhow::anyhow!(NOT_FOUND))
}

#[tracing::instrument(skip(state, req))]
pub async fn create_student(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateStudentRequest>,
) -> Result<(StatusCode, Json<StudentResponse>), AppError> {
    let student = state
        .students
        .insert(req.into())
        .await
        .map_err(|e| rejected("create", e, "Error creating student"))?;

    record_operation("create", "ok");
    tracing::info!(student_id = %student.id, "Student created");
    Ok((StatusCode::CREATED, Json(student.into())))
}

#[tracing::instrument(skip(state))]
pub async fn list_students(
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentResponse>>, AppError> {
    let students = state
        .students
        .list()
        .await
        .map_err(|e| failed("list", e, "Error fetching students"))?;

    record_operation("list", "ok");
    Ok(Json(students.into_iter().map(StudentResponse::from).collect()))
}

#[tracing::instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StudentResponse>, AppError> {
    let student = state
        .students
        .find_by_id(&id)
        .await
        .map_err(|e| failed("get", e, "Error fetching student"))?
        .ok_or_else(|| not_found("get"))?;

    record_operation("get", "ok");
    Ok(Json(student.into()))
}

#[tracing::instrument(skip(state, req))]
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateStudentRequest>,
) -> Result<Json<StudentResponse>, AppError> {
    let student = state
        .students
        .update(&id, req.into())
        .await
        .map_err(|e| rejected("update", e, "Error updating student"))?
        .ok_or_else(|| not_found("update"))?;

    record_operation("update", "ok");
    tracing::info!(student_id = %student.id, "Student updated");
    Ok(Json(student.into()))
}

#[tracing::instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let student = state
        .students
        .delete(&id)
        .await
        .map_err(|e| failed("delete", e, "Error deleting student"))?
        .ok_or_else(|| not_found("delete"))?;

    record_operation("delete", "ok");
    tracing::info!(student_id = %student.id, "Student deleted");
    Ok(Json(MessageResponse {
        message: "Student deleted successfully".to_string(),
    }))
}
