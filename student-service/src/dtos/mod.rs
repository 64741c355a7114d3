pub mod health;
pub mod student;

pub use health::HealthResponse;
pub use student::{CreateStudentRequest, MessageResponse, StudentResponse, UpdateStudentRequest};
