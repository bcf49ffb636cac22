#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod library_service;
pub mod lookup;
pub mod sessions;

pub use vocab_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use error::{AppServicesError, LibraryError, LookupError, SessionError};
pub use library_service::{LibraryService, SaveToggle};
pub use lookup::{CachedLookup, LookupProvider};

pub use sessions::{
    GradeResult, QueueBuilder, SessionEngine, SessionProgress, SessionReview, SessionState,
    StudyQueue, StudySession, StudyStart, build_queue,
};
