use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::{NewStudent, Student, StudentPatch};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudentRequest {
    #[validate(
        required(message = "name is required"),
        length(min = 1, message = "name is required")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "email is required"),
        length(min = 1, message = "email is required")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "course is required"),
        length(min = 1, message = "course is required")
    )]
    pub course: Option<String>,

    #[validate(required(message = "grade is required"))]
    pub grade: Option<f64>,
}

impl From<CreateStudentRequest> for NewStudent {
    /// Only called on a validated request, where every field is present.
    fn from(req: CreateStudentRequest) -> Self {
        NewStudent {
            name: req.name.unwrap_or_default(),
            email: req.email.unwrap_or_default(),
            course: req.course.unwrap_or_default(),
            grade: req.grade.unwrap_or_default(),
        }
    }
}

/// Partial update. An absent field is left alone; a field sent as `null`
/// (or an empty string) is a validation error because every business field
/// is required on the stored record.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateStudentRequest {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub course: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub grade: Option<Option<f64>>,
}

/// Marks a key that appeared in the body, even with a `null` value.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn required(field: &'static str) -> ValidationError {
    let mut error = ValidationError::new("required");
    error.message = Some(format!("{} is required", field).into());
    error
}

fn check_text(errors: &mut ValidationErrors, field: &'static str, value: &Option<Option<String>>) {
    match value {
        Some(None) => errors.add(field, required(field)),
        Some(Some(text)) if text.is_empty() => errors.add(field, required(field)),
        _ => {}
    }
}

impl Validate for UpdateStudentRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_text(&mut errors, "name", &self.name);
        check_text(&mut errors, "email", &self.email);
        check_text(&mut errors, "course", &self.course);
        if let Some(None) = self.grade {
            errors.add("grade", required("grade"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl From<UpdateStudentRequest> for StudentPatch {
    fn from(req: UpdateStudentRequest) -> Self {
        StudentPatch {
            name: req.name.flatten(),
            email: req.email.flatten(),
            course: req.course.flatten(),
            grade: req.grade.flatten(),
        }
    }
}

/// Wire representation of a student record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudentResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub course: String,
    pub grade: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Student> for StudentResponse {
    fn from(s: Student) -> Self {
        StudentResponse {
            id: s.id.to_hex(),
            name: s.name,
            email: s.email,
            course: s.course,
            grade: s.grade,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
