#![allow(dead_code)]

use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use student_service::config::{MongoConfig, StoreBackend, StudentConfig, DEFAULT_MONGODB_URI};
use student_service::services::{MongoStudentStore, StudentStore};
use student_service::startup::Application;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
    pub mongo: Option<(MongoStudentStore, String)>,
}

pub fn test_config(store: StoreBackend, database: Option<String>) -> StudentConfig {
    StudentConfig {
        // Use random port for testing (port 0)
        common: CoreConfig { port: 0 },
        mongodb: MongoConfig {
            uri: std::env::var("TEST_MONGODB_URI")
                .unwrap_or_else(|_| DEFAULT_MONGODB_URI.to_string()),
            database,
        },
        store,
        log_level: "warn".to_string(),
        otlp_endpoint: None,
    }
}

impl TestApp {
    /// Spawn the application backed by the in-memory store.
    pub async fn spawn() -> Self {
        let app = Application::build(test_config(StoreBackend::Memory, None))
            .await
            .expect("Failed to build test application");
        Self::start(app, None).await
    }

    /// Spawn the application around a caller-provided store.
    pub async fn spawn_with_store(store: Arc<dyn StudentStore>) -> Self {
        let app = Application::build_with_store(test_config(StoreBackend::Memory, None), store)
            .await
            .expect("Failed to build test application");
        Self::start(app, None).await
    }

    /// Spawn against a throwaway MongoDB database, or `None` when
    /// `TEST_MONGODB_URI` is not set.
    pub async fn spawn_mongo() -> Option<Self> {
        let uri = std::env::var("TEST_MONGODB_URI").ok()?;
        let db_name = format!("student_test_{}", uuid::Uuid::new_v4().simple());

        let store = MongoStudentStore::connect(&uri, &db_name)
            .await
            .expect("Failed to connect to MongoDB");
        store
            .initialize_indexes()
            .await
            .expect("Failed to create indexes");

        let config = test_config(StoreBackend::Mongo, Some(db_name.clone()));
        let app = Application::build_with_store(config, Arc::new(store.clone()))
            .await
            .expect("Failed to build test application");
        Some(Self::start(app, Some((store, db_name))).await)
    }

    async fn start(app: Application, mongo: Option<(MongoStudentStore, String)>) -> Self {
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/api/v1/healthcheck", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
            mongo,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }

    pub async fn create_student(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url("/students"))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Drop the throwaway database, if any.
    pub async fn cleanup(&self) {
        if let Some((store, db_name)) = &self.mongo {
            let _ = store.client().database(db_name).drop(None).await;
        }
    }
}

pub fn jane() -> serde_json::Value {
    serde_json::json!({
        "name": "Jane Doe",
        "email": "jane.doe@example.com",
        "course": "Mathematics",
        "grade": 90
    })
}
