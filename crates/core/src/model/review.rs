use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::item::ItemKind;
use crate::model::level::SrsLevel;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur while interpreting review input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("invalid review grade: {0:?}")]
    InvalidGrade(String),
}

//
// ─── REVIEW GRADE ─────────────────────────────────────────────────────────────
//

/// Two-valued grading input for a reviewed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewGrade {
    /// Recalled the item. The level goes up.
    Correct,
    /// Failed to recall. The item comes back after the shortest interval.
    Incorrect,
}

impl ReviewGrade {
    /// Parses interactive answers such as `y`, `n`, `correct`, `incorrect`.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::InvalidGrade` for anything else.
    pub fn from_answer(answer: &str) -> Result<Self, ReviewError> {
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" | "correct" | "c" => Ok(Self::Correct),
            "n" | "no" | "incorrect" | "x" => Ok(Self::Incorrect),
            other => Err(ReviewError::InvalidGrade(other.to_owned())),
        }
    }

    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, Self::Correct)
    }
}

//
// ─── REVIEW STATE ─────────────────────────────────────────────────────────────
//

/// Review-state shape shared by every saved item.
///
/// Timestamps are persisted as milliseconds since the Unix epoch. A missing or
/// `null` `next_review` means the item is due immediately.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReviewState {
    #[serde(default)]
    srs_level: SrsLevel,
    #[serde(default, with = "crate::model::millis::option")]
    next_review: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "crate::model::millis::option",
        skip_serializing_if = "Option::is_none"
    )]
    date_saved: Option<DateTime<Utc>>,
}

impl ReviewState {
    /// State for a freshly saved item: level 0, due right away.
    #[must_use]
    pub fn fresh(saved_at: DateTime<Utc>) -> Self {
        Self {
            srs_level: SrsLevel::NEW,
            next_review: Some(saved_at),
            date_saved: Some(saved_at),
        }
    }

    /// Rehydrate a state from persisted parts. The level is already clamped by `SrsLevel`.
    #[must_use]
    pub fn from_persisted(
        srs_level: SrsLevel,
        next_review: Option<DateTime<Utc>>,
        date_saved: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            srs_level,
            next_review,
            date_saved,
        }
    }

    #[must_use]
    pub fn srs_level(&self) -> SrsLevel {
        self.srs_level
    }

    #[must_use]
    pub fn next_review(&self) -> Option<DateTime<Utc>> {
        self.next_review
    }

    #[must_use]
    pub fn date_saved(&self) -> Option<DateTime<Utc>> {
        self.date_saved
    }

    /// True iff `next_review` is unset or `next_review <= now`.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review.is_none_or(|at| at <= now)
    }

    /// Level and next review change together; only the scheduler calls this.
    pub(crate) fn reschedule(&mut self, level: SrsLevel, next_review: DateTime<Utc>) {
        self.srs_level = level;
        self.next_review = Some(next_review);
    }
}

//
// ─── REVIEW LOG ───────────────────────────────────────────────────────────────
//

/// Record of a single graded review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewLog {
    pub kind: ItemKind,
    pub identity: String,
    pub grade: ReviewGrade,
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewLog {
    #[must_use]
    pub fn new(
        kind: ItemKind,
        identity: impl Into<String>,
        grade: ReviewGrade,
        reviewed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            identity: identity.into(),
            grade,
            reviewed_at,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn answers_map_to_grades() {
        assert_eq!(ReviewGrade::from_answer(" Y ").unwrap(), ReviewGrade::Correct);
        assert_eq!(ReviewGrade::from_answer("n").unwrap(), ReviewGrade::Incorrect);
        let err = ReviewGrade::from_answer("maybe").unwrap_err();
        assert!(matches!(err, ReviewError::InvalidGrade(ref s) if s == "maybe"));
    }

    #[test]
    fn due_when_unset_or_past_or_exactly_now() {
        let now = fixed_now();
        let unset = ReviewState::from_persisted(SrsLevel::NEW, None, None);
        let past =
            ReviewState::from_persisted(SrsLevel::NEW, Some(now - Duration::seconds(1)), None);
        let exact = ReviewState::from_persisted(SrsLevel::NEW, Some(now), None);
        let future =
            ReviewState::from_persisted(SrsLevel::NEW, Some(now + Duration::milliseconds(1)), None);

        assert!(unset.is_due(now));
        assert!(past.is_due(now));
        assert!(exact.is_due(now));
        assert!(!future.is_due(now));
    }

    #[test]
    fn fresh_state_is_immediately_due() {
        let state = ReviewState::fresh(fixed_now());
        assert_eq!(state.srs_level(), SrsLevel::NEW);
        assert_eq!(state.date_saved(), Some(fixed_now()));
        assert!(state.is_due(fixed_now()));
    }

    #[test]
    fn state_decodes_millis_and_nulls() {
        let json = r#"{"srs_level": 2, "next_review": null}"#;
        let state: ReviewState = serde_json::from_str(json).unwrap();
        assert_eq!(state.srs_level().value(), 2);
        assert!(state.next_review().is_none());

        let json = r#"{"next_review": 1700000000000}"#;
        let state: ReviewState = serde_json::from_str(json).unwrap();
        assert_eq!(state.srs_level(), SrsLevel::NEW);
        assert_eq!(state.next_review(), Some(fixed_now()));
    }
}
