use crate::models::{NewStudent, Student, StudentPatch};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

/// Server error code for a unique index violation.
pub const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid student id: {0}")]
    InvalidId(String),

    #[error("{0}")]
    DuplicateKey(String),

    #[error(transparent)]
    Database(#[from] mongodb::error::Error),

    #[error("Database unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for student records.
///
/// Lookups by id take the raw path segment; implementations reject anything
/// that is not a 24-hex ObjectId with [`StoreError::InvalidId`]. Operations
/// that target one record return `Ok(None)` when it does not exist.
#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn insert(&self, new: NewStudent) -> Result<Student, StoreError>;
    async fn list(&self) -> Result<Vec<Student>, StoreError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Student>, StoreError>;
    /// Returns the record as it is after the update.
    async fn update(&self, id: &str, patch: StudentPatch) -> Result<Option<Student>, StoreError>;
    async fn delete(&self, id: &str) -> Result<Option<Student>, StoreError>;
    async fn ping(&self) -> Result<(), StoreError>;
}

pub fn parse_id(id: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))
}

/// Stand-in used when the database client could not be created at startup.
/// The service keeps serving; every data operation fails.
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> Result<T, StoreError> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }
}

#[async_trait]
impl StudentStore for UnavailableStore {
    async fn insert(&self, _new: NewStudent) -> Result<Student, StoreError> {
        self.fail()
    }

    async fn list(&self) -> Result<Vec<Student>, StoreError> {
        self.fail()
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<Student>, StoreError> {
        self.fail()
    }

    async fn update(&self, _id: &str, _patch: StudentPatch) -> Result<Option<Student>, StoreError> {
        self.fail()
    }

    async fn delete(&self, _id: &str) -> Result<Option<Student>, StoreError> {
        self.fail()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.fail()
    }
}
