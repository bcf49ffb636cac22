use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ParseError;
use crate::model::{ItemKind, ReviewGrade, ReviewLog};

//
// ─── SESSION ID ────────────────────────────────────────────────────────────────
//

/// Unique identifier for a study session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── STUDY SCOPE / MODE ────────────────────────────────────────────────────────
//

/// Which collections a study session draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyScope {
    Word,
    Sentence,
    #[default]
    All,
}

impl StudyScope {
    #[must_use]
    pub fn includes(self, kind: ItemKind) -> bool {
        match self {
            Self::All => true,
            Self::Word => kind == ItemKind::Word,
            Self::Sentence => kind == ItemKind::Sentence,
        }
    }
}

impl FromStr for StudyScope {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "word" | "words" => Ok(Self::Word),
            "sentence" | "sentences" => Ok(Self::Sentence),
            "all" => Ok(Self::All),
            _ => Err(ParseError::new("StudyScope", s)),
        }
    }
}

/// Whether a session takes only due items or everything in scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyMode {
    #[default]
    Due,
    All,
}

impl FromStr for StudyMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "due" => Ok(Self::Due),
            "all" => Ok(Self::All),
            _ => Err(ParseError::new("StudyMode", s)),
        }
    }
}

//
// ─── SESSION SUMMARY ───────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("too many logs for a single session: {len}")]
    TooManyLogs { len: usize },
}

/// Aggregate summary for a completed study session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    session_id: SessionId,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    total_reviews: u32,
    correct: u32,
    incorrect: u32,
}

impl SessionSummary {
    /// Build a summary from the logs of a session.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError::InvalidTimeRange` if `completed_at` is before `started_at`.
    /// Returns `SessionSummaryError::TooManyLogs` if the log count cannot fit in `u32`.
    pub fn from_logs(
        session_id: SessionId,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        logs: &[ReviewLog],
    ) -> Result<Self, SessionSummaryError> {
        if completed_at < started_at {
            return Err(SessionSummaryError::InvalidTimeRange);
        }
        let total_reviews = u32::try_from(logs.len())
            .map_err(|_| SessionSummaryError::TooManyLogs { len: logs.len() })?;

        let mut correct = 0_u32;
        let mut incorrect = 0_u32;
        for log in logs {
            match log.grade {
                ReviewGrade::Correct => correct = correct.saturating_add(1),
                ReviewGrade::Incorrect => incorrect = incorrect.saturating_add(1),
            }
        }

        Ok(Self {
            session_id,
            started_at,
            completed_at,
            total_reviews,
            correct,
            incorrect,
        })
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn total_reviews(&self) -> u32 {
        self.total_reviews
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.incorrect
    }
}
