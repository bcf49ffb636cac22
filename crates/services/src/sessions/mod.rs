mod progress;
mod queue;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::SessionProgress;
pub use queue::{QueueBuilder, StudyQueue, build_queue};
pub use service::{SessionReview, StudySession};
pub use workflow::{CompletionHook, GradeResult, SessionEngine, SessionState, StudyStart};
