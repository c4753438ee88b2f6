#![forbid(unsafe_code)]

pub mod repository;
pub mod saved;
pub mod sqlite;

pub use repository::{InMemoryKeyValueStore, KeyValueStore, Storage, StorageError};
pub use saved::{SAVED_INTERVIEWS_KEY, SavedInterviews};
