use storage::ItemStore;
use vocab_core::model::{
    DueCounts, ItemKind, LevelBuckets, ReviewState, ReviewableItem, SentenceEntry, SrsLevel,
    WordEntry, count_due,
};
use vocab_core::scheduler::Scheduler;

use crate::Clock;
use crate::error::LibraryError;

const CSV_BOM: &str = "\u{feff}";
const CSV_HEADER: [&str; 4] = ["Type", "English", "IPA", "Vietnamese"];

/// Whether a toggle saved or removed the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveToggle {
    Saved,
    Removed,
}

/// Save, remove and summarize the two study collections.
#[derive(Clone)]
pub struct LibraryService {
    clock: Clock,
    store: ItemStore,
    scheduler: Scheduler,
}

impl LibraryService {
    #[must_use]
    pub fn new(clock: Clock, store: ItemStore) -> Self {
        Self {
            clock,
            store,
            scheduler: Scheduler::new(),
        }
    }

    /// Scheduler whose intervals label the level buckets.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    #[must_use]
    pub fn store(&self) -> &ItemStore {
        &self.store
    }

    /// Save a word at the front of the collection with a fresh review state.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::EmptyIdentity` for a blank word,
    /// `LibraryError::AlreadySaved` if the word is already stored, and
    /// `LibraryError::Storage` if the collection cannot be read or saved.
    pub async fn save_word(&self, mut entry: WordEntry) -> Result<(), LibraryError> {
        entry.word = entry.word.trim().to_owned();
        ensure_identity(ItemKind::Word, &entry.word)?;

        let mut words = self.store.try_load_words().await?;
        if words
            .iter()
            .any(|w| ItemKind::Word.same_identity(&w.word, &entry.word))
        {
            return Err(LibraryError::AlreadySaved {
                kind: ItemKind::Word,
                identity: entry.word,
            });
        }

        entry.review = ReviewState::fresh(self.clock.now());
        tracing::debug!(word = %entry.word, "saving word");
        words.insert(0, entry);
        self.store.save_words(&words).await?;
        Ok(())
    }

    /// Save a sentence at the front of the collection with a fresh review state.
    ///
    /// # Errors
    ///
    /// Same as [`LibraryService::save_word`].
    pub async fn save_sentence(&self, mut entry: SentenceEntry) -> Result<(), LibraryError> {
        entry.sentence = entry.sentence.trim().to_owned();
        ensure_identity(ItemKind::Sentence, &entry.sentence)?;

        let mut sentences = self.store.try_load_sentences().await?;
        if sentences
            .iter()
            .any(|s| ItemKind::Sentence.same_identity(&s.sentence, &entry.sentence))
        {
            return Err(LibraryError::AlreadySaved {
                kind: ItemKind::Sentence,
                identity: entry.sentence,
            });
        }

        entry.review = ReviewState::fresh(self.clock.now());
        tracing::debug!(sentence = %entry.sentence, "saving sentence");
        sentences.insert(0, entry);
        self.store.save_sentences(&sentences).await?;
        Ok(())
    }

    /// Remove the word if it is saved, otherwise save it.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError` if validation or persistence fails.
    pub async fn toggle_word(&self, entry: WordEntry) -> Result<SaveToggle, LibraryError> {
        if self.remove(ItemKind::Word, &entry.word).await? {
            return Ok(SaveToggle::Removed);
        }
        self.save_word(entry).await?;
        Ok(SaveToggle::Saved)
    }

    /// Remove the sentence if it is saved, otherwise save it.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError` if validation or persistence fails.
    pub async fn toggle_sentence(&self, entry: SentenceEntry) -> Result<SaveToggle, LibraryError> {
        if self.remove(ItemKind::Sentence, &entry.sentence).await? {
            return Ok(SaveToggle::Removed);
        }
        self.save_sentence(entry).await?;
        Ok(SaveToggle::Saved)
    }

    /// # Errors
    ///
    /// Returns `LibraryError::Storage` if the collection cannot be saved.
    pub async fn remove_word(&self, word: &str) -> Result<bool, LibraryError> {
        self.remove(ItemKind::Word, word).await
    }

    /// # Errors
    ///
    /// Returns `LibraryError::Storage` if the collection cannot be saved.
    pub async fn remove_sentence(&self, sentence: &str) -> Result<bool, LibraryError> {
        self.remove(ItemKind::Sentence, sentence).await
    }

    /// Remove every entry matching `identity`. Returns whether anything was removed.
    ///
    /// The collection is only written when it changed.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Storage` if the collection cannot be read or saved.
    pub async fn remove(&self, kind: ItemKind, identity: &str) -> Result<bool, LibraryError> {
        let identity = identity.trim();
        let removed = match kind {
            ItemKind::Word => {
                let mut words = self.store.try_load_words().await?;
                let before = words.len();
                words.retain(|w| !kind.same_identity(&w.word, identity));
                let removed = words.len() != before;
                if removed {
                    self.store.save_words(&words).await?;
                }
                removed
            }
            ItemKind::Sentence => {
                let mut sentences = self.store.try_load_sentences().await?;
                let before = sentences.len();
                sentences.retain(|s| !kind.same_identity(&s.sentence, identity));
                let removed = sentences.len() != before;
                if removed {
                    self.store.save_sentences(&sentences).await?;
                }
                removed
            }
        };

        if removed {
            tracing::debug!(%kind, identity, "removed from library");
        }
        Ok(removed)
    }

    pub async fn is_saved(&self, kind: ItemKind, identity: &str) -> bool {
        let identity = identity.trim();
        self.store
            .load(kind)
            .await
            .iter()
            .any(|item| item.has_identity(identity))
    }

    /// Items due now in each collection.
    pub async fn due_counts(&self) -> DueCounts {
        let library = self.store.load_library().await;
        let now = self.clock.now();
        DueCounts {
            words: count_due(library.words.iter().map(|w| &w.review), now),
            sentences: count_due(library.sentences.iter().map(|s| &s.review), now),
        }
    }

    /// Per-level counts across both collections.
    pub async fn level_buckets(&self) -> LevelBuckets {
        let library = self.store.load_library().await;
        let states = library
            .words
            .iter()
            .map(|w| &w.review)
            .chain(library.sentences.iter().map(|s| &s.review));
        LevelBuckets::tally(states, self.scheduler.interval_days())
    }

    /// Items of one kind in stored order, optionally restricted to one level.
    pub async fn list(&self, kind: ItemKind, level: Option<SrsLevel>) -> Vec<ReviewableItem> {
        let items = self.store.load(kind).await;
        match level {
            None => items,
            Some(level) => items
                .into_iter()
                .filter(|item| item.review().srs_level() == level)
                .collect(),
        }
    }

    /// Both collections as CSV, words first, prefixed with a UTF-8 BOM.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Export` if a record cannot be written.
    pub async fn export_csv(&self) -> Result<String, LibraryError> {
        let library = self.store.load_library().await;

        let mut writer = csv::Writer::from_writer(CSV_BOM.as_bytes().to_vec());
        writer.write_record(CSV_HEADER).map_err(export_error)?;
        for word in &library.words {
            let ipa = format!("/{}/", word.ipa);
            writer
                .write_record(["Word", word.word.as_str(), ipa.as_str(), word.meaning_vi.as_str()])
                .map_err(export_error)?;
        }
        for sentence in &library.sentences {
            writer
                .write_record([
                    "Sentence",
                    sentence.sentence.as_str(),
                    "",
                    sentence.meaning_vi.as_str(),
                ])
                .map_err(export_error)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| LibraryError::Export(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| LibraryError::Export(e.to_string()))
    }
}

fn ensure_identity(kind: ItemKind, identity: &str) -> Result<(), LibraryError> {
    if identity.is_empty() {
        return Err(LibraryError::EmptyIdentity { kind });
    }
    Ok(())
}

fn export_error(err: csv::Error) -> LibraryError {
    LibraryError::Export(err.to_string())
}
