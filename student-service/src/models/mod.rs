//! Domain models for student-service.

mod student;

pub use student::{NewStudent, Student, StudentPatch};
