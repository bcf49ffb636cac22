#![forbid(unsafe_code)]

pub mod collection;
pub mod repository;
pub mod sqlite;

pub use collection::{ItemStore, Library, UpsertOutcome};
pub use repository::{InMemoryKeyValueStore, KeyValueStore, StorageError};
