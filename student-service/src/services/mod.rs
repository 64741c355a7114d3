pub mod database;
pub mod memory;
pub mod metrics;
pub mod store;

pub use database::MongoStudentStore;
pub use memory::InMemoryStudentStore;
pub use metrics::{get_metrics, init_metrics, record_operation};
pub use store::{parse_id, StoreError, StudentStore, UnavailableStore};
