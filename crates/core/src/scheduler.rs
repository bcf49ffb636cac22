use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{LEVEL_COUNT, ReviewGrade, ReviewLog, ReviewableItem, SrsLevel};

/// Days until the next review, indexed by the level being entered.
pub const DEFAULT_INTERVAL_DAYS: [u32; LEVEL_COUNT] = [1, 3, 7, 14, 30];

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("interval for level {level} must be at least one day, got {days}")]
    IntervalTooShort { level: usize, days: u32 },
    #[error("intervals must not decrease: level {level} has {days} days after {previous}")]
    DecreasingInterval { level: usize, days: u32, previous: u32 },
}

//
// ─── LAPSE POLICY ──────────────────────────────────────────────────────────────
//

/// What an incorrect answer does to the level.
///
/// Either way the item is rescheduled after the level-0 interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LapsePolicy {
    /// Drop one level, flooring at 0.
    #[default]
    Demote,
    /// Go straight back to level 0.
    Reset,
}

//
// ─── SCHEDULED REVIEW ──────────────────────────────────────────────────────────
//

/// New level and next-review timestamp produced by a grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledReview {
    pub level: SrsLevel,
    pub next_review: DateTime<Utc>,
    pub interval_days: u32,
}

/// Outcome of applying a grade to an item: the updated item and its log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedReview {
    pub item: ReviewableItem,
    pub previous_level: SrsLevel,
    pub scheduled: ScheduledReview,
    pub log: ReviewLog,
}

//
// ─── SCHEDULER ─────────────────────────────────────────────────────────────────
//

/// Fixed-interval spaced-repetition scheduler.
///
/// A correct answer moves the item up one level (plateauing at 4) and schedules
/// it after that level's interval. An incorrect answer applies the
/// [`LapsePolicy`] and schedules the item after the level-0 interval.
///
/// # Examples
///
/// ```
/// # use vocab_core::scheduler::Scheduler;
/// # use vocab_core::model::{ReviewGrade, SrsLevel};
/// # use vocab_core::time::fixed_now;
/// let scheduler = Scheduler::new();
/// let now = fixed_now();
/// let next = scheduler.compute_next_review(SrsLevel::clamped(2), ReviewGrade::Correct, now);
///
/// assert_eq!(next.level.value(), 3);
/// assert_eq!(next.next_review, now + chrono::Duration::days(14));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduler {
    interval_days: [u32; LEVEL_COUNT],
    lapse_policy: LapsePolicy,
}

impl Scheduler {
    /// Scheduler with the default `1/3/7/14/30` day table and demotion on lapse.
    #[must_use]
    pub fn new() -> Self {
        Self {
            interval_days: DEFAULT_INTERVAL_DAYS,
            lapse_policy: LapsePolicy::Demote,
        }
    }

    /// Create a scheduler with a custom interval table.
    ///
    /// # Errors
    ///
    /// - `IntervalTooShort` if any interval is zero
    /// - `DecreasingInterval` if a level's interval is shorter than the previous one
    pub fn try_with_intervals(interval_days: [u32; LEVEL_COUNT]) -> Result<Self, SchedulerError> {
        let mut previous = 0;
        for (level, &days) in interval_days.iter().enumerate() {
            if days == 0 {
                return Err(SchedulerError::IntervalTooShort { level, days });
            }
            if days < previous {
                return Err(SchedulerError::DecreasingInterval {
                    level,
                    days,
                    previous,
                });
            }
            previous = days;
        }

        Ok(Self {
            interval_days,
            lapse_policy: LapsePolicy::Demote,
        })
    }

    #[must_use]
    pub fn with_lapse_policy(mut self, lapse_policy: LapsePolicy) -> Self {
        self.lapse_policy = lapse_policy;
        self
    }

    #[must_use]
    pub fn lapse_policy(&self) -> LapsePolicy {
        self.lapse_policy
    }

    #[must_use]
    pub fn interval_days(&self) -> [u32; LEVEL_COUNT] {
        self.interval_days
    }

    /// Days scheduled when an item enters `level`.
    #[must_use]
    pub fn interval_for(&self, level: SrsLevel) -> u32 {
        self.interval_days[level.index()]
    }

    /// Map `(level, grade, now)` to the new level and next review time.
    ///
    /// Pure and total: the same inputs always give the same output.
    #[must_use]
    pub fn compute_next_review(
        &self,
        level: SrsLevel,
        grade: ReviewGrade,
        now: DateTime<Utc>,
    ) -> ScheduledReview {
        let (level, interval_days) = match grade {
            ReviewGrade::Correct => {
                let promoted = level.promoted();
                (promoted, self.interval_for(promoted))
            }
            ReviewGrade::Incorrect => {
                let lapsed = match self.lapse_policy {
                    LapsePolicy::Demote => level.demoted(),
                    LapsePolicy::Reset => SrsLevel::NEW,
                };
                (lapsed, self.interval_for(SrsLevel::NEW))
            }
        };

        ScheduledReview {
            level,
            next_review: now + Duration::days(i64::from(interval_days)),
            interval_days,
        }
    }

    /// Grade an item, returning an updated copy with level and `next_review`
    /// changed together. The input item is left untouched.
    #[must_use]
    pub fn apply_review(
        &self,
        item: &ReviewableItem,
        grade: ReviewGrade,
        reviewed_at: DateTime<Utc>,
    ) -> AppliedReview {
        let previous_level = item.review().srs_level();
        let scheduled = self.compute_next_review(previous_level, grade, reviewed_at);

        let mut updated = item.clone();
        updated
            .review_mut()
            .reschedule(scheduled.level, scheduled.next_review);

        let log = ReviewLog::new(item.kind(), item.identity(), grade, reviewed_at);

        AppliedReview {
            item: updated,
            previous_level,
            scheduled,
            log,
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// [`Scheduler::compute_next_review`] with the default configuration.
#[must_use]
pub fn compute_next_review(
    level: SrsLevel,
    grade: ReviewGrade,
    now: DateTime<Utc>,
) -> ScheduledReview {
    Scheduler::new().compute_next_review(level, grade, now)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
