//! Result store implementations

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryResultStore;
pub use sqlite::{SqliteResultStore, SqliteStoreConfig};
