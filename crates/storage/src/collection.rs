use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use vocab_core::model::{ItemKind, ReviewableItem, SentenceEntry, WordEntry};

use crate::repository::{InMemoryKeyValueStore, KeyValueStore, StorageError};

/// Storage key for the vocabulary collection.
pub const WORDS_KEY: &str = "flashcards";
/// Storage key for the sentence collection.
pub const SENTENCES_KEY: &str = "saved_sentences";

#[must_use]
pub fn key_for(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Word => WORDS_KEY,
        ItemKind::Sentence => SENTENCES_KEY,
    }
}

/// Both collections as loaded at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Library {
    pub words: Vec<WordEntry>,
    pub sentences: Vec<SentenceEntry>,
}

/// Result of writing a single graded item back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The matching entry was replaced and the collection saved.
    Replaced,
    /// No entry with that identity exists any more; nothing was written.
    Missing,
}

/// Item Store: two independent collections with whole-collection save semantics.
///
/// The `load_*` reads never fail: a missing key, a backend read error, or a
/// payload that does not decode yields an empty collection. Read-modify-write
/// paths use `try_load_*`, which only propagates backend read errors.
#[derive(Clone)]
pub struct ItemStore {
    kv: Arc<dyn KeyValueStore>,
}

impl ItemStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryKeyValueStore::new()))
    }

    pub async fn load_words(&self) -> Vec<WordEntry> {
        load_collection(self.kv.as_ref(), WORDS_KEY).await
    }

    pub async fn load_sentences(&self) -> Vec<SentenceEntry> {
        load_collection(self.kv.as_ref(), SENTENCES_KEY).await
    }

    /// Load the vocabulary collection, failing if the backend cannot be read.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend read fails. Missing or corrupt
    /// payloads still load as empty.
    pub async fn try_load_words(&self) -> Result<Vec<WordEntry>, StorageError> {
        try_load_collection(self.kv.as_ref(), WORDS_KEY).await
    }

    /// Load the sentence collection, failing if the backend cannot be read.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend read fails.
    pub async fn try_load_sentences(&self) -> Result<Vec<SentenceEntry>, StorageError> {
        try_load_collection(self.kv.as_ref(), SENTENCES_KEY).await
    }

    pub async fn load_library(&self) -> Library {
        Library {
            words: self.load_words().await,
            sentences: self.load_sentences().await,
        }
    }

    /// Load one collection as tagged items.
    pub async fn load(&self, kind: ItemKind) -> Vec<ReviewableItem> {
        match kind {
            ItemKind::Word => self
                .load_words()
                .await
                .into_iter()
                .map(ReviewableItem::Word)
                .collect(),
            ItemKind::Sentence => self
                .load_sentences()
                .await
                .into_iter()
                .map(ReviewableItem::Sentence)
                .collect(),
        }
    }

    /// Overwrite the vocabulary collection.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the backend write fails.
    pub async fn save_words(&self, words: &[WordEntry]) -> Result<(), StorageError> {
        save_collection(self.kv.as_ref(), WORDS_KEY, words).await
    }

    /// Overwrite the sentence collection.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the backend write fails.
    pub async fn save_sentences(&self, sentences: &[SentenceEntry]) -> Result<(), StorageError> {
        save_collection(self.kv.as_ref(), SENTENCES_KEY, sentences).await
    }

    /// Replace the entry matching `item`'s identity and save its collection.
    ///
    /// Items removed since they were loaded are ignored rather than re-inserted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the collection cannot be read or saved.
    pub async fn upsert_item(&self, item: &ReviewableItem) -> Result<UpsertOutcome, StorageError> {
        match item {
            ReviewableItem::Word(updated) => {
                let mut words = self.try_load_words().await?;
                let Some(slot) = words
                    .iter_mut()
                    .find(|w| ItemKind::Word.same_identity(&w.word, &updated.word))
                else {
                    return Ok(UpsertOutcome::Missing);
                };
                *slot = updated.clone();
                self.save_words(&words).await?;
            }
            ReviewableItem::Sentence(updated) => {
                let mut sentences = self.try_load_sentences().await?;
                let Some(slot) = sentences
                    .iter_mut()
                    .find(|s| s.sentence == updated.sentence)
                else {
                    return Ok(UpsertOutcome::Missing);
                };
                *slot = updated.clone();
                self.save_sentences(&sentences).await?;
            }
        }
        Ok(UpsertOutcome::Replaced)
    }
}

async fn load_collection<T: DeserializeOwned>(kv: &dyn KeyValueStore, key: &str) -> Vec<T> {
    match try_load_collection(kv, key).await {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!(key, error = %err, "collection read failed, using empty collection");
            Vec::new()
        }
    }
}

async fn try_load_collection<T: DeserializeOwned>(
    kv: &dyn KeyValueStore,
    key: &str,
) -> Result<Vec<T>, StorageError> {
    let Some(raw) = kv.get(key).await? else {
        return Ok(Vec::new());
    };

    match serde_json::from_str::<Vec<T>>(&raw) {
        Ok(items) => Ok(items),
        Err(err) => {
            tracing::warn!(
                key,
                error = %err,
                "collection payload is corrupt, using empty collection"
            );
            Ok(Vec::new())
        }
    }
}

async fn save_collection<T: Serialize>(
    kv: &dyn KeyValueStore,
    key: &str,
    items: &[T],
) -> Result<(), StorageError> {
    let payload =
        serde_json::to_string(items).map_err(|e| StorageError::Serialization(e.to_string()))?;
    kv.put(key, &payload).await
}
