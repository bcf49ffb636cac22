//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use vocab_core::model::{ItemKind, SessionSummaryError};

/// Errors emitted by the session engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no items available for session")]
    Empty,
    #[error("a study session is already in progress")]
    AlreadyActive,
    #[error("no item is being presented")]
    NotPresenting,
    #[error("session already completed")]
    Completed,
    #[error("graded {got:?} but the current item is {expected:?}")]
    OutOfOrder { expected: String, got: String },
    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `LibraryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LibraryError {
    #[error("{kind} text must not be empty")]
    EmptyIdentity { kind: ItemKind },
    #[error("{kind} {identity:?} is already saved")]
    AlreadySaved { kind: ItemKind, identity: String },
    #[error("export failed: {0}")]
    Export(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by lookup providers and the lookup cache.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LookupError {
    #[error("lookup query is empty")]
    EmptyQuery,
    #[error("lookup provider failed: {0}")]
    Provider(String),
    #[error("lookup cache is unavailable: {0}")]
    Cache(String),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
