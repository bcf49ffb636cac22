use chrono::{DateTime, Utc};
use std::fmt;

use storage::UpsertOutcome;
use vocab_core::model::{ReviewGrade, ReviewLog, ReviewableItem, SessionId, SessionSummary};
use vocab_core::scheduler::{AppliedReview, Scheduler};

use super::progress::SessionProgress;
use super::queue::StudyQueue;
use crate::error::SessionError;

//
// ─── REVIEW RESULT WITH ITEM ───────────────────────────────────────────────────
//

/// Captures the outcome of grading one queue slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReview {
    pub index: usize,
    pub applied: AppliedReview,
    pub persisted: UpsertOutcome,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One pass over a fixed queue.
///
/// The queue never changes after start. Grading is split in two steps so the
/// caller can persist the updated item before the session advances:
/// [`StudySession::grade_current`] computes the update, `record` advances.
pub struct StudySession {
    id: SessionId,
    queue: StudyQueue,
    current: usize,
    results: Vec<SessionReview>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl StudySession {
    /// Start presenting `queue` at index 0.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the queue has no items.
    pub fn start(queue: StudyQueue, started_at: DateTime<Utc>) -> Result<Self, SessionError> {
        if queue.is_empty() {
            return Err(SessionError::Empty);
        }

        Ok(Self {
            id: SessionId::new(),
            queue,
            current: 0,
            results: Vec::new(),
            started_at,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn results(&self) -> &[SessionReview] {
        &self.results
    }

    #[must_use]
    pub fn queue(&self) -> &StudyQueue {
        &self.queue
    }

    /// Index of the item being presented.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn total_items(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len().saturating_sub(self.current)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.total_items(),
            answered: self.answered_count(),
            remaining: self.remaining(),
            is_complete: self.is_complete(),
        }
    }

    #[must_use]
    pub fn current_item(&self) -> Option<&ReviewableItem> {
        self.queue.get(self.current)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Compute the update for the current item without advancing.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if every item has been graded.
    pub fn grade_current(
        &self,
        scheduler: &Scheduler,
        grade: ReviewGrade,
        reviewed_at: DateTime<Utc>,
    ) -> Result<AppliedReview, SessionError> {
        let item = self.current_item().ok_or(SessionError::Completed)?;
        Ok(scheduler.apply_review(item, grade, reviewed_at))
    }

    /// Commit a graded update for the current item and advance.
    pub(crate) fn record(
        &mut self,
        applied: AppliedReview,
        persisted: UpsertOutcome,
        reviewed_at: DateTime<Utc>,
    ) -> Result<&SessionReview, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        let current = self.current_item().ok_or(SessionError::Completed)?;
        if current.kind() != applied.log.kind || current.identity() != applied.log.identity {
            return Err(SessionError::OutOfOrder {
                expected: current.identity().to_owned(),
                got: applied.log.identity.clone(),
            });
        }

        self.results.push(SessionReview {
            index: self.current,
            applied,
            persisted,
        });

        self.current += 1;
        if self.current >= self.queue.len() {
            self.completed_at = Some(reviewed_at);
        }

        self.results.last().ok_or(SessionError::Completed)
    }

    pub(crate) fn build_summary(&self) -> Result<SessionSummary, SessionError> {
        let completed_at = self.completed_at.ok_or(SessionError::NotPresenting)?;
        let logs: Vec<ReviewLog> = self
            .results
            .iter()
            .map(|review| review.applied.log.clone())
            .collect();
        Ok(SessionSummary::from_logs(
            self.id,
            self.started_at,
            completed_at,
            &logs,
        )?)
    }
}

impl fmt::Debug for StudySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudySession")
            .field("id", &self.id)
            .field("queue_len", &self.queue.len())
            .field("current", &self.current)
            .field("results_len", &self.results.len())
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_core::model::{ReviewState, WordEntry};
    use vocab_core::time::fixed_now;

    fn queue_of(words: &[&str]) -> StudyQueue {
        StudyQueue::new(
            words
                .iter()
                .map(|w| {
                    let mut entry = WordEntry::new(*w, "nghĩa");
                    entry.review = ReviewState::fresh(fixed_now());
                    ReviewableItem::Word(entry)
                })
                .collect(),
        )
    }

    #[test]
    fn empty_queue_does_not_start() {
        let err = StudySession::start(StudyQueue::default(), fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::Empty));
    }

    #[test]
    fn grade_current_does_not_advance() {
        let session = StudySession::start(queue_of(&["a", "b"]), fixed_now()).unwrap();
        let applied = session
            .grade_current(&Scheduler::new(), ReviewGrade::Correct, fixed_now())
            .unwrap();
        assert_eq!(applied.log.identity, "a");
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.answered_count(), 0);
    }

    #[test]
    fn record_advances_and_completes() {
        let scheduler = Scheduler::new();
        let mut session = StudySession::start(queue_of(&["a", "b"]), fixed_now()).unwrap();

        let first = session
            .grade_current(&scheduler, ReviewGrade::Correct, fixed_now())
            .unwrap();
        session
            .record(first, UpsertOutcome::Replaced, fixed_now())
            .unwrap();
        assert_eq!(session.current_item().unwrap().identity(), "b");
        assert!(!session.is_complete());

        let second = session
            .grade_current(&scheduler, ReviewGrade::Incorrect, fixed_now())
            .unwrap();
        let review = session
            .record(second, UpsertOutcome::Replaced, fixed_now())
            .unwrap();
        assert_eq!(review.index, 1);
        assert!(session.is_complete());
        assert!(session.current_item().is_none());
        assert_eq!(session.completed_at(), Some(fixed_now()));

        let summary = session.build_summary().unwrap();
        assert_eq!(summary.total_reviews(), 2);
        assert_eq!(summary.correct(), 1);
        assert_eq!(summary.incorrect(), 1);
        assert_eq!(summary.session_id(), session.id());

        let err = session
            .grade_current(&scheduler, ReviewGrade::Correct, fixed_now())
            .unwrap_err();
        assert!(matches!(err, SessionError::Completed));
    }

    #[test]
    fn record_rejects_update_for_another_slot() {
        let scheduler = Scheduler::new();
        let mut other = StudySession::start(queue_of(&["x"]), fixed_now()).unwrap();
        let foreign = other
            .grade_current(&scheduler, ReviewGrade::Correct, fixed_now())
            .unwrap();

        let mut session = StudySession::start(queue_of(&["a"]), fixed_now()).unwrap();
        let err = session
            .record(foreign.clone(), UpsertOutcome::Replaced, fixed_now())
            .unwrap_err();
        assert!(matches!(err, SessionError::OutOfOrder { .. }));
        assert_eq!(session.current_index(), 0);

        other.record(foreign, UpsertOutcome::Replaced, fixed_now()).unwrap();
        assert!(other.is_complete());
    }

    #[test]
    fn progress_tracks_counts() {
        let scheduler = Scheduler::new();
        let mut session = StudySession::start(queue_of(&["a", "b", "c"]), fixed_now()).unwrap();
        let applied = session
            .grade_current(&scheduler, ReviewGrade::Correct, fixed_now())
            .unwrap();
        session
            .record(applied, UpsertOutcome::Missing, fixed_now())
            .unwrap();

        let progress = session.progress();
        assert_eq!(progress.total, 3);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.remaining, 2);
        assert!(!progress.is_complete);
    }
}
