use std::fmt;
use std::sync::Arc;

use storage::{ItemStore, UpsertOutcome};
use vocab_core::Clock;
use vocab_core::model::{
    ReviewGrade, ReviewableItem, SessionId, SessionSummary, StudyMode, StudyScope,
};
use vocab_core::scheduler::Scheduler;

use super::progress::SessionProgress;
use super::queue::{QueueBuilder, StudyQueue};
use super::service::{SessionReview, StudySession};
use crate::error::SessionError;

/// Callback invoked once when a session reaches `Completed`.
pub type CompletionHook = Arc<dyn Fn(&SessionSummary) + Send + Sync>;

/// Externally visible engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Presenting { index: usize, total: usize },
    Completed,
}

/// Result of asking the engine to start studying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyStart {
    /// Nothing matched the scope and mode. The engine is left `Idle` and any
    /// previous summary is cleared.
    Empty,
    Started { session_id: SessionId, total: usize },
}

/// Result of grading the presented item.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeResult {
    pub review: SessionReview,
    pub persisted: UpsertOutcome,
    pub state: SessionState,
    pub summary: Option<SessionSummary>,
}

enum Phase {
    Idle,
    Presenting(StudySession),
    Completed(SessionSummary),
}

/// Drives one study session at a time against an `ItemStore`.
///
/// Every graded item is written through to the store and the write is awaited
/// before the next item is presented.
pub struct SessionEngine {
    clock: Clock,
    scheduler: Scheduler,
    store: ItemStore,
    phase: Phase,
    on_complete: Option<CompletionHook>,
}

impl SessionEngine {
    #[must_use]
    pub fn new(store: ItemStore) -> Self {
        Self {
            clock: Clock::default(),
            scheduler: Scheduler::new(),
            store,
            phase: Phase::Idle,
            on_complete: None,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    #[must_use]
    pub fn with_on_complete(mut self, hook: CompletionHook) -> Self {
        self.on_complete = Some(hook);
        self
    }

    /// Replace the clock, e.g. to move a fixed clock forward between grades.
    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Load both collections, build a queue and start presenting it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyActive` if a session is being presented.
    pub async fn start_study(
        &mut self,
        scope: StudyScope,
        mode: StudyMode,
    ) -> Result<StudyStart, SessionError> {
        self.ensure_not_presenting()?;
        let now = self.clock.now();
        let library = self.store.load_library().await;
        let queue = QueueBuilder::new(scope, mode).build(&library.words, &library.sentences, now);
        self.start_with_queue(queue)
    }

    /// Start presenting a prepared queue.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyActive` if a session is being presented.
    pub fn start_with_queue(&mut self, queue: StudyQueue) -> Result<StudyStart, SessionError> {
        self.ensure_not_presenting()?;
        if queue.is_empty() {
            tracing::debug!("study queue is empty, nothing to start");
            self.phase = Phase::Idle;
            return Ok(StudyStart::Empty);
        }

        let session = StudySession::start(queue, self.clock.now())?;
        let started = StudyStart::Started {
            session_id: session.id(),
            total: session.total_items(),
        };
        tracing::info!(
            session_id = %session.id(),
            total = session.total_items(),
            "study session started"
        );
        self.phase = Phase::Presenting(session);
        Ok(started)
    }

    /// Grade the presented item, persist it, then advance.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotPresenting` or `SessionError::Completed` when
    /// there is no item to grade, and `SessionError::Storage` if the write
    /// fails. A failed write leaves the engine on the same item.
    pub async fn grade_current(&mut self, grade: ReviewGrade) -> Result<GradeResult, SessionError> {
        let session = match &mut self.phase {
            Phase::Presenting(session) => session,
            Phase::Completed(_) => return Err(SessionError::Completed),
            Phase::Idle => return Err(SessionError::NotPresenting),
        };

        let reviewed_at = self.clock.now();
        let applied = session.grade_current(&self.scheduler, grade, reviewed_at)?;
        let persisted = self.store.upsert_item(&applied.item).await?;
        if persisted == UpsertOutcome::Missing {
            tracing::debug!(
                kind = %applied.log.kind,
                identity = %applied.log.identity,
                "item no longer stored, skipping write"
            );
        }

        let review = session.record(applied, persisted, reviewed_at)?.clone();
        if !session.is_complete() {
            return Ok(GradeResult {
                review,
                persisted,
                state: self.state(),
                summary: None,
            });
        }

        let summary = session.build_summary()?;
        tracing::info!(
            session_id = %summary.session_id(),
            correct = summary.correct(),
            incorrect = summary.incorrect(),
            "study session completed"
        );
        self.phase = Phase::Completed(summary.clone());
        if let Some(hook) = &self.on_complete {
            hook(&summary);
        }

        Ok(GradeResult {
            review,
            persisted,
            state: SessionState::Completed,
            summary: Some(summary),
        })
    }

    /// End the current session without grading the rest of the queue.
    ///
    /// Items already graded stay persisted. Returns the number of items
    /// that were dropped.
    pub fn abandon(&mut self) -> usize {
        let dropped = match &self.phase {
            Phase::Presenting(session) => session.remaining(),
            Phase::Idle | Phase::Completed(_) => 0,
        };
        if let Phase::Presenting(session) = &self.phase {
            tracing::info!(session_id = %session.id(), dropped, "study session abandoned");
        }
        self.phase = Phase::Idle;
        dropped
    }

    #[must_use]
    pub fn current_item(&self) -> Option<&ReviewableItem> {
        match &self.phase {
            Phase::Presenting(session) => session.current_item(),
            Phase::Idle | Phase::Completed(_) => None,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        match &self.phase {
            Phase::Idle => SessionState::Idle,
            Phase::Presenting(session) => SessionState::Presenting {
                index: session.current_index(),
                total: session.total_items(),
            },
            Phase::Completed(_) => SessionState::Completed,
        }
    }

    #[must_use]
    pub fn progress(&self) -> Option<SessionProgress> {
        match &self.phase {
            Phase::Presenting(session) => Some(session.progress()),
            Phase::Idle | Phase::Completed(_) => None,
        }
    }

    /// Summary of the most recently completed session, until a new one starts.
    #[must_use]
    pub fn last_summary(&self) -> Option<&SessionSummary> {
        match &self.phase {
            Phase::Completed(summary) => Some(summary),
            Phase::Idle | Phase::Presenting(_) => None,
        }
    }

    fn ensure_not_presenting(&self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Presenting(_) => Err(SessionError::AlreadyActive),
            Phase::Idle | Phase::Completed(_) => Ok(()),
        }
    }
}

impl fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionEngine")
            .field("clock", &self.clock)
            .field("scheduler", &self.scheduler)
            .field("state", &self.state())
            .field("has_on_complete", &self.on_complete.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use vocab_core::model::{ReviewState, WordEntry};
    use vocab_core::time::{fixed_clock, fixed_now};

    fn stored_word(word: &str) -> WordEntry {
        let mut entry = WordEntry::new(word, "nghĩa");
        entry.review = ReviewState::fresh(fixed_now());
        entry
    }

    async fn engine_with(words: &[&str]) -> SessionEngine {
        let store = ItemStore::in_memory();
        let entries: Vec<_> = words.iter().map(|w| stored_word(w)).collect();
        store.save_words(&entries).await.unwrap();
        SessionEngine::new(store).with_clock(fixed_clock())
    }

    #[tokio::test]
    async fn idle_engine_rejects_grading() {
        let mut engine = engine_with(&[]).await;
        assert_eq!(engine.state(), SessionState::Idle);
        let err = engine.grade_current(ReviewGrade::Correct).await.unwrap_err();
        assert!(matches!(err, SessionError::NotPresenting));
    }

    #[tokio::test]
    async fn empty_study_stays_idle() {
        let mut engine = engine_with(&[]).await;
        let start = engine
            .start_study(StudyScope::All, StudyMode::Due)
            .await
            .unwrap();
        assert_eq!(start, StudyStart::Empty);
        assert_eq!(engine.state(), SessionState::Idle);
        assert!(engine.current_item().is_none());
    }

    #[tokio::test]
    async fn second_start_while_presenting_is_rejected() {
        let mut engine = engine_with(&["a", "b"]).await;
        engine.start_study(StudyScope::All, StudyMode::All).await.unwrap();

        let err = engine
            .start_study(StudyScope::All, StudyMode::All)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::AlreadyActive));
        assert_eq!(
            engine.state(),
            SessionState::Presenting { index: 0, total: 2 }
        );
    }

    #[tokio::test]
    async fn completion_invokes_hook_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut engine = engine_with(&["only"]).await.with_on_complete(Arc::new(
            move |summary: &SessionSummary| {
                sink.lock().unwrap().push(summary.total_reviews());
            },
        ));

        engine.start_study(StudyScope::Word, StudyMode::All).await.unwrap();
        let result = engine.grade_current(ReviewGrade::Correct).await.unwrap();

        assert_eq!(result.state, SessionState::Completed);
        assert_eq!(result.summary.as_ref().map(SessionSummary::correct), Some(1));
        assert_eq!(*seen.lock().unwrap(), vec![1]);
        assert!(engine.last_summary().is_some());

        let err = engine.grade_current(ReviewGrade::Correct).await.unwrap_err();
        assert!(matches!(err, SessionError::Completed));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn completed_engine_can_start_again() {
        let mut engine = engine_with(&["again"]).await;
        engine.start_study(StudyScope::All, StudyMode::All).await.unwrap();
        engine.grade_current(ReviewGrade::Incorrect).await.unwrap();
        assert_eq!(engine.state(), SessionState::Completed);

        let start = engine.start_study(StudyScope::All, StudyMode::All).await.unwrap();
        assert!(matches!(start, StudyStart::Started { total: 1, .. }));
        assert!(engine.last_summary().is_none());
    }

    #[tokio::test]
    async fn empty_start_after_completion_returns_to_idle() {
        let mut engine = engine_with(&["done"]).await;
        engine.start_study(StudyScope::All, StudyMode::Due).await.unwrap();
        engine.grade_current(ReviewGrade::Incorrect).await.unwrap();
        assert!(engine.last_summary().is_some());

        // the only item is now scheduled a day ahead
        let start = engine.start_study(StudyScope::All, StudyMode::Due).await.unwrap();
        assert_eq!(start, StudyStart::Empty);
        assert_eq!(engine.state(), SessionState::Idle);
        assert!(engine.last_summary().is_none());
    }

    #[tokio::test]
    async fn abandon_reports_dropped_tail() {
        let mut engine = engine_with(&["a", "b", "c"]).await;
        engine.start_study(StudyScope::All, StudyMode::All).await.unwrap();
        engine.grade_current(ReviewGrade::Correct).await.unwrap();

        assert_eq!(engine.abandon(), 2);
        assert_eq!(engine.state(), SessionState::Idle);
        assert_eq!(engine.abandon(), 0);
    }
}
