use crate::models::{NewStudent, Student, StudentPatch};
use crate::services::store::{parse_id, StoreError, StudentStore, DUPLICATE_KEY_CODE};
use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;
use std::sync::Arc;
use tokio::sync::OnceCell;

#[derive(Clone)]
pub struct MongoStudentStore {
    client: MongoClient,
    db: Database,
    /// Set once the unique email index is known to exist; shared by clones.
    indexes: Arc<OnceCell<()>>,
}

impl MongoStudentStore {
    /// Build the client. The driver connects lazily, so this only fails on a
    /// malformed connection string or an unresolvable SRV record.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        Ok(Self {
            client,
            db,
            indexes: Arc::new(OnceCell::new()),
        })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        self.ensure_indexes().await.map_err(|e| {
            tracing::error!("Failed to create email index: {}", e);
            AppError::from(e)
        })
    }

    /// Create the indexes on first use. A failed attempt leaves the cell
    /// empty, so the next write tries again.
    async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        self.indexes
            .get_or_try_init(|| self.create_indexes())
            .await
            .map(|_| ())
    }

    async fn create_indexes(&self) -> Result<(), mongodb::error::Error> {
        tracing::info!("Creating MongoDB indexes for student-service");

        // Unique email is what rejects a second student with the same address
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .name("email_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.students().create_index(email_index, None).await?;

        tracing::info!("Successfully created all MongoDB indexes");
        Ok(())
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn students(&self) -> Collection<Student> {
        self.db.collection("students")
    }
}

/// Map a driver error, pulling unique index violations out as
/// [`StoreError::DuplicateKey`] with the server's message.
fn classify(err: mongodb::error::Error) -> StoreError {
    let duplicate = match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE =>
        {
            Some(write_error.message.clone())
        }
        ErrorKind::Command(command_error) if command_error.code == DUPLICATE_KEY_CODE => {
            Some(command_error.message.clone())
        }
        _ => None,
    };

    match duplicate {
        Some(message) => StoreError::DuplicateKey(message),
        None => StoreError::Database(err),
    }
}

#[async_trait]
impl StudentStore for MongoStudentStore {
    async fn insert(&self, new: NewStudent) -> Result<Student, StoreError> {
        self.ensure_indexes().await.map_err(|e| {
            tracing::error!("Email index unavailable, refusing insert: {}", e);
            classify(e)
        })?;

        let student = Student::create(new);
        self.students()
            .insert_one(&student, None)
            .await
            .map_err(|e| {
                tracing::warn!("Failed to insert student: {}", e);
                classify(e)
            })?;
        Ok(student)
    }

    async fn list(&self) -> Result<Vec<Student>, StoreError> {
        let find_options = FindOptions::builder().sort(doc! { "_id": 1 }).build();

        let cursor = self
            .students()
            .find(doc! {}, find_options)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list students: {}", e);
                classify(e)
            })?;

        let students: Vec<Student> = cursor.try_collect().await.map_err(|e| {
            tracing::error!("Failed to collect students: {}", e);
            classify(e)
        })?;

        Ok(students)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Student>, StoreError> {
        let oid = parse_id(id)?;
        self.students()
            .find_one(doc! { "_id": oid }, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to find student: {}", e);
                classify(e)
            })
    }

    async fn update(&self, id: &str, patch: StudentPatch) -> Result<Option<Student>, StoreError> {
        let oid = parse_id(id)?;
        if patch.email.is_some() {
            self.ensure_indexes().await.map_err(|e| {
                tracing::error!("Email index unavailable, refusing update: {}", e);
                classify(e)
            })?;
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.students()
            .find_one_and_update(doc! { "_id": oid }, patch.to_update(Utc::now()), options)
            .await
            .map_err(|e| {
                tracing::warn!("Failed to update student: {}", e);
                classify(e)
            })
    }

    async fn delete(&self, id: &str) -> Result<Option<Student>, StoreError> {
        let oid = parse_id(id)?;
        self.students()
            .find_one_and_delete(doc! { "_id": oid }, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete student: {}", e);
                classify(e)
            })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(classify)?;
        Ok(())
    }
}
