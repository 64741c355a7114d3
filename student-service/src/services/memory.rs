use crate::models::{NewStudent, Student, StudentPatch};
use crate::services::store::{parse_id, StoreError, StudentStore};
use async_trait::async_trait;
use mongodb::bson;
use tokio::sync::RwLock;

/// Process-local store with the same contract as the MongoDB one: generated
/// ObjectIds, insertion order, unique email.
#[derive(Default)]
pub struct InMemoryStudentStore {
    students: RwLock<Vec<Student>>,
}

impl InMemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate_email(email: &str) -> StoreError {
    StoreError::DuplicateKey(format!(
        "E11000 duplicate key error collection: students index: email_unique dup key: {{ email: \"{}\" }}",
        email
    ))
}

#[async_trait]
impl StudentStore for InMemoryStudentStore {
    async fn insert(&self, new: NewStudent) -> Result<Student, StoreError> {
        let mut students = self.students.write().await;
        if students.iter().any(|s| s.email == new.email) {
            return Err(duplicate_email(&new.email));
        }

        let student = Student::create(new);
        students.push(student.clone());
        Ok(student)
    }

    async fn list(&self) -> Result<Vec<Student>, StoreError> {
        Ok(self.students.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Student>, StoreError> {
        let oid = parse_id(id)?;
        Ok(self
            .students
            .read()
            .await
            .iter()
            .find(|s| s.id == oid)
            .cloned())
    }

    async fn update(&self, id: &str, patch: StudentPatch) -> Result<Option<Student>, StoreError> {
        let oid = parse_id(id)?;
        let mut students = self.students.write().await;

        // An unmatched id is a miss even when the patch would collide
        let Some(index) = students.iter().position(|s| s.id == oid) else {
            return Ok(None);
        };

        if let Some(email) = &patch.email {
            if students.iter().any(|s| s.id != oid && &s.email == email) {
                return Err(duplicate_email(email));
            }
        }

        let student = &mut students[index];
        student.apply(patch, bson::DateTime::now().to_chrono());
        Ok(Some(student.clone()))
    }

    async fn delete(&self, id: &str) -> Result<Option<Student>, StoreError> {
        let oid = parse_id(id)?;
        let mut students = self.students.write().await;
        Ok(students
            .iter()
            .position(|s| s.id == oid)
            .map(|index| students.remove(index)))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
