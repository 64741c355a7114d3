//! Application startup and lifecycle management.
//!
//! Opens the student store, assembles the router and binds the listener.
//! A database that cannot be reached never stops the process from serving.

use crate::config::{StoreBackend, StudentConfig};
use crate::handlers;
use crate::services::{InMemoryStudentStore, MongoStudentStore, StudentStore, UnavailableStore};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::{request_id_middleware, REQUEST_ID_HEADER},
};
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

static PROCESS_START: OnceLock<Instant> = OnceLock::new();

/// When the process started. The first call fixes the value, so `main`
/// calls this before doing anything else.
pub fn process_started_at() -> Instant {
    *PROCESS_START.get_or_init(Instant::now)
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub students: Arc<dyn StudentStore>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(students: Arc<dyn StudentStore>) -> Self {
        Self {
            students,
            started_at: process_started_at(),
        }
    }
}

/// Routes under `/api/v1` plus `/metrics`, wrapped in the shared middleware.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/healthcheck", get(handlers::health_check))
        .route(
            "/students",
            post(handlers::create_student).get(handlers::list_students),
        )
        .route(
            "/students/:id",
            get(handlers::get_student)
                .put(handlers::update_student)
                .delete(handlers::delete_student),
        );

    Router::new()
        .nest("/api/v1", api)
        .route("/metrics", get(handlers::metrics_endpoint))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Open the configured store.
///
/// For MongoDB only client construction happens inline; connecting and
/// index creation run in the background and failures are logged, not fatal.
pub async fn open_store(config: &StudentConfig) -> Arc<dyn StudentStore> {
    match config.store {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory student store, records are lost on restart");
            Arc::new(InMemoryStudentStore::new())
        }
        StoreBackend::Mongo => {
            let database = config.mongodb.database_name();
            match MongoStudentStore::connect(&config.mongodb.uri, &database).await {
                Ok(store) => {
                    tokio::spawn(bootstrap(store.clone()));
                    Arc::new(store)
                }
                Err(e) => {
                    tracing::error!("MongoDB connection error: {}", e);
                    Arc::new(UnavailableStore::new(e.to_string()))
                }
            }
        }
    }
}

/// Warm-up only. When the ping fails the index is created by the first write.
async fn bootstrap(store: MongoStudentStore) {
    if let Err(e) = store.ping().await {
        tracing::error!("MongoDB connection error: {}", e);
        return;
    }
    tracing::info!("Connected to MongoDB");

    if let Err(e) = store.initialize_indexes().await {
        tracing::error!("Failed to initialize database indexes: {}", e);
    }
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the store selected by configuration.
    pub async fn build(config: StudentConfig) -> Result<Self, AppError> {
        let students = open_store(&config).await;
        Self::build_with_store(config, students).await
    }

    /// Build the application around an already opened store.
    pub async fn build_with_store(
        config: StudentConfig,
        students: Arc<dyn StudentStore>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(students);

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Server is running on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until the process ends.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        axum::serve(self.listener, router).await
    }
}
