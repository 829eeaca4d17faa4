//! Storage mechanisms for persisting session state

pub mod file;
pub mod memory;
pub mod traits;
pub mod users_db;

// Re-export the storage backends
pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::{read_json, write_json, KeyValueStore};
pub use users_db::MockUserDb;
