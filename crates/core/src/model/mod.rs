mod item;
mod level;
pub mod millis;
mod progress;
mod review;
mod session;

pub use item::{ItemKind, ReviewableItem, SentenceEntry, SimilarSentence, WordEntry, is_due};
pub use level::{LEVEL_COUNT, SrsLevel};
pub use progress::{DueCounts, LevelBuckets, MasteryStatus, count_due};
pub use review::{ReviewError, ReviewGrade, ReviewLog, ReviewState};
pub use session::{SessionId, SessionSummary, SessionSummaryError, StudyMode, StudyScope};
