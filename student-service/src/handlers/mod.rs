//! HTTP handlers for student-service.

pub mod health;
pub mod metrics;
pub mod students;

pub use health::health_check;
pub use metrics::metrics_endpoint;
pub use students::{create_student, delete_student, get_student, list_students, update_student};
