use chrono::{DateTime, Utc};

use crate::model::level::{LEVEL_COUNT, SrsLevel};
use crate::model::review::ReviewState;

/// Coarse learning status shown next to a saved item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MasteryStatus {
    /// Levels 0 and 1.
    NewlyLearned,
    /// Levels 2 and 3.
    Remembering,
    /// Level 4.
    Mastered,
}

impl MasteryStatus {
    #[must_use]
    pub fn for_level(level: SrsLevel) -> Self {
        match level.value() {
            0 | 1 => Self::NewlyLearned,
            2 | 3 => Self::Remembering,
            _ => Self::Mastered,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::NewlyLearned => "newly learned",
            Self::Remembering => "remembering",
            Self::Mastered => "mastered",
        }
    }
}

/// Number of due items per collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DueCounts {
    pub words: usize,
    pub sentences: usize,
}

impl DueCounts {
    #[must_use]
    pub fn total(&self) -> usize {
        self.words + self.sentences
    }
}

/// Item counts per SRS level, with the interval each level schedules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelBuckets {
    counts: [usize; LEVEL_COUNT],
    interval_days: [u32; LEVEL_COUNT],
}

impl LevelBuckets {
    /// Count levels across review states.
    #[must_use]
    pub fn tally<'a>(
        states: impl IntoIterator<Item = &'a ReviewState>,
        interval_days: [u32; LEVEL_COUNT],
    ) -> Self {
        let mut counts = [0_usize; LEVEL_COUNT];
        for state in states {
            counts[state.srs_level().index()] += 1;
        }
        Self {
            counts,
            interval_days,
        }
    }

    #[must_use]
    pub fn count(&self, level: SrsLevel) -> usize {
        self.counts[level.index()]
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `(level, count, interval_days)` rows in ascending level order.
    pub fn rows(&self) -> impl Iterator<Item = (SrsLevel, usize, u32)> + '_ {
        SrsLevel::all().map(|level| {
            (
                level,
                self.counts[level.index()],
                self.interval_days[level.index()],
            )
        })
    }
}

/// Count due review states at `now`.
#[must_use]
pub fn count_due<'a>(
    states: impl IntoIterator<Item = &'a ReviewState>,
    now: DateTime<Utc>,
) -> usize {
    states.into_iter().filter(|s| s.is_due(now)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn state(level: i64, due_in_days: i64) -> ReviewState {
        ReviewState::from_persisted(
            SrsLevel::clamped(level),
            Some(fixed_now() + Duration::days(due_in_days)),
            None,
        )
    }

    #[test]
    fn status_thresholds() {
        assert_eq!(MasteryStatus::for_level(SrsLevel::clamped(1)), MasteryStatus::NewlyLearned);
        assert_eq!(MasteryStatus::for_level(SrsLevel::clamped(2)), MasteryStatus::Remembering);
        assert_eq!(MasteryStatus::for_level(SrsLevel::clamped(3)), MasteryStatus::Remembering);
        assert_eq!(MasteryStatus::for_level(SrsLevel::MASTERED), MasteryStatus::Mastered);
    }

    #[test]
    fn buckets_tally_each_level() {
        let states = [state(0, 0), state(0, 1), state(2, 1), state(4, 30)];
        let buckets = LevelBuckets::tally(states.iter(), [1, 3, 7, 14, 30]);

        assert_eq!(buckets.count(SrsLevel::NEW), 2);
        assert_eq!(buckets.count(SrsLevel::clamped(1)), 0);
        assert_eq!(buckets.count(SrsLevel::clamped(2)), 1);
        assert_eq!(buckets.count(SrsLevel::MASTERED), 1);
        assert_eq!(buckets.total(), 4);

        let last = buckets.rows().last().unwrap();
        assert_eq!(last, (SrsLevel::MASTERED, 1, 30));
    }

    #[test]
    fn due_count_uses_predicate() {
        let states = [state(0, -1), state(1, 0), state(2, 3)];
        assert_eq!(count_due(states.iter(), fixed_now()), 2);
    }
}
