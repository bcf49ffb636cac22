use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;

use vocab_core::model::{ItemKind, ReviewableItem, SentenceEntry, StudyMode, StudyScope, WordEntry};

/// Fixed, owned snapshot of the items selected for one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudyQueue {
    items: Vec<ReviewableItem>,
}

impl StudyQueue {
    #[must_use]
    pub fn new(items: Vec<ReviewableItem>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ReviewableItem> {
        self.items.get(index)
    }

    #[must_use]
    pub fn items(&self) -> &[ReviewableItem] {
        &self.items
    }

    pub fn identities(&self) -> impl Iterator<Item = (ItemKind, &str)> {
        self.items.iter().map(|item| (item.kind(), item.identity()))
    }
}

/// Selects study candidates and puts them in a uniformly random order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueBuilder {
    scope: StudyScope,
    mode: StudyMode,
}

impl QueueBuilder {
    #[must_use]
    pub fn new(scope: StudyScope, mode: StudyMode) -> Self {
        Self { scope, mode }
    }

    #[must_use]
    pub fn scope(&self) -> StudyScope {
        self.scope
    }

    #[must_use]
    pub fn mode(&self) -> StudyMode {
        self.mode
    }

    /// Words then sentences, filtered by scope and (in due mode) the due predicate.
    ///
    /// Inputs are cloned, never mutated.
    #[must_use]
    pub fn select(
        &self,
        words: &[WordEntry],
        sentences: &[SentenceEntry],
        now: DateTime<Utc>,
    ) -> Vec<ReviewableItem> {
        let keep = |item: &ReviewableItem| match self.mode {
            StudyMode::All => true,
            StudyMode::Due => item.is_due(now),
        };

        let word_items = self
            .scope
            .includes(ItemKind::Word)
            .then(|| words.iter().cloned().map(ReviewableItem::Word))
            .into_iter()
            .flatten();
        let sentence_items = self
            .scope
            .includes(ItemKind::Sentence)
            .then(|| sentences.iter().cloned().map(ReviewableItem::Sentence))
            .into_iter()
            .flatten();

        word_items.chain(sentence_items).filter(keep).collect()
    }

    /// Build a queue shuffled with the thread-local RNG.
    #[must_use]
    pub fn build(
        &self,
        words: &[WordEntry],
        sentences: &[SentenceEntry],
        now: DateTime<Utc>,
    ) -> StudyQueue {
        self.build_with_rng(words, sentences, now, &mut rand::rng())
    }

    /// Build a queue using the given RNG for the Fisher–Yates shuffle.
    #[must_use]
    pub fn build_with_rng<R: Rng + ?Sized>(
        &self,
        words: &[WordEntry],
        sentences: &[SentenceEntry],
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> StudyQueue {
        let mut items = self.select(words, sentences, now);
        items.as_mut_slice().shuffle(rng);
        StudyQueue::new(items)
    }
}

/// Convenience wrapper around [`QueueBuilder::build`].
#[must_use]
pub fn build_queue(
    scope: StudyScope,
    mode: StudyMode,
    words: &[WordEntry],
    sentences: &[SentenceEntry],
    now: DateTime<Utc>,
) -> StudyQueue {
    QueueBuilder::new(scope, mode).build(words, sentences, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::{BTreeSet, HashMap};
    use vocab_core::model::{ReviewState, SrsLevel};
    use vocab_core::time::fixed_now;

    fn word(text: &str, due_in_days: i64) -> WordEntry {
        let mut entry = WordEntry::new(text, "nghĩa");
        entry.review = ReviewState::from_persisted(
            SrsLevel::NEW,
            Some(fixed_now() + Duration::days(due_in_days)),
            Some(fixed_now()),
        );
        entry
    }

    fn sentence(text: &str, due_in_days: i64) -> SentenceEntry {
        let mut entry = SentenceEntry::new(text, "câu");
        entry.review = ReviewState::from_persisted(
            SrsLevel::NEW,
            Some(fixed_now() + Duration::days(due_in_days)),
            Some(fixed_now()),
        );
        entry
    }

    fn identity_set(queue: &StudyQueue) -> BTreeSet<String> {
        queue.identities().map(|(_, id)| id.to_owned()).collect()
    }

    #[test]
    fn all_scope_all_mode_returns_every_item_once() {
        let words: Vec<_> = (0..5).map(|i| word(&format!("w{i}"), 5)).collect();
        let sentences: Vec<_> = (0..3).map(|i| sentence(&format!("s{i}."), 5)).collect();

        let queue = build_queue(StudyScope::All, StudyMode::All, &words, &sentences, fixed_now());

        assert_eq!(queue.len(), 8);
        let ids = identity_set(&queue);
        assert_eq!(ids.len(), 8);
        for expected in ["w0", "w1", "w2", "w3", "w4", "s0.", "s1.", "s2."] {
            assert!(ids.contains(expected));
        }
    }

    #[test]
    fn due_mode_filters_with_predicate() {
        let mut never = word("never-set", 10);
        never.review = ReviewState::from_persisted(SrsLevel::NEW, None, None);
        let words = vec![word("past", -1), word("now", 0), word("later", 1), never];

        let queue = build_queue(StudyScope::Word, StudyMode::Due, &words, &[], fixed_now());
        let ids = identity_set(&queue);
        assert_eq!(
            ids,
            ["never-set", "now", "past"].into_iter().map(String::from).collect()
        );
    }

    #[test]
    fn due_mode_with_nothing_due_is_empty() {
        let words = vec![word("a", 1)];
        let sentences = vec![sentence("b.", 2)];
        let queue = build_queue(StudyScope::All, StudyMode::Due, &words, &sentences, fixed_now());
        assert!(queue.is_empty());
    }

    #[test]
    fn scope_selects_collections() {
        let words = vec![word("a", 0)];
        let sentences = vec![sentence("b.", 0)];

        let only_words = build_queue(
            StudyScope::Word,
            StudyMode::All,
            &words,
            &sentences,
            fixed_now(),
        );
        assert!(only_words.items().iter().all(|i| i.kind() == ItemKind::Word));
        assert_eq!(only_words.len(), 1);

        let only_sentences =
            build_queue(StudyScope::Sentence, StudyMode::All, &words, &sentences, fixed_now());
        assert!(only_sentences.items().iter().all(|i| i.kind() == ItemKind::Sentence));
        assert_eq!(only_sentences.len(), 1);
    }

    #[test]
    fn select_keeps_words_before_sentences_and_leaves_inputs_alone() {
        let words = vec![word("a", 0), word("b", 0)];
        let sentences = vec![sentence("c.", 0)];
        let before = (words.clone(), sentences.clone());

        let selected = QueueBuilder::new(StudyScope::All, StudyMode::All).select(
            &words,
            &sentences,
            fixed_now(),
        );
        let order: Vec<_> = selected.iter().map(ReviewableItem::identity).collect();
        assert_eq!(order, vec!["a", "b", "c."]);
        assert_eq!((words, sentences), before);
    }

    #[test]
    fn seeded_builds_are_reproducible_permutations() {
        let words: Vec<_> = (0..6).map(|i| word(&format!("w{i}"), 0)).collect();
        let builder = QueueBuilder::new(StudyScope::All, StudyMode::All);

        let a = builder.build_with_rng(&words, &[], fixed_now(), &mut StdRng::seed_from_u64(7));
        let b = builder.build_with_rng(&words, &[], fixed_now(), &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert_eq!(identity_set(&a).len(), 6);
    }

    #[test]
    fn shuffle_places_every_item_in_every_position() {
        let words: Vec<_> = (0..3).map(|i| word(&format!("w{i}"), 0)).collect();
        let builder = QueueBuilder::new(StudyScope::Word, StudyMode::All);
        let mut rng = StdRng::seed_from_u64(42);
        let mut first_positions: HashMap<String, usize> = HashMap::new();

        let runs = 3000;
        for _ in 0..runs {
            let queue = builder.build_with_rng(&words, &[], fixed_now(), &mut rng);
            let first = queue.get(0).unwrap().identity().to_owned();
            *first_positions.entry(first).or_default() += 1;
        }

        // each of 3 items should lead roughly a third of the time
        for id in ["w0", "w1", "w2"] {
            let count = first_positions.get(id).copied().unwrap_or_default();
            assert!((800..1200).contains(&count), "{id} led {count} times");
        }
    }
}
