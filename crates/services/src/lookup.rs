use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use vocab_core::model::{ItemKind, SentenceEntry, WordEntry};

use crate::error::LookupError;

/// Source of dictionary details for words and analyses for sentences.
///
/// Providers receive the already normalized query.
#[async_trait]
pub trait LookupProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns `LookupError::Provider` when the lookup cannot be completed.
    async fn lookup_word(&self, word: &str) -> Result<WordEntry, LookupError>;

    /// # Errors
    ///
    /// Returns `LookupError::Provider` when the lookup cannot be completed.
    async fn lookup_sentence(&self, sentence: &str) -> Result<SentenceEntry, LookupError>;
}

/// Memoizes a provider for the lifetime of the value.
///
/// Failed lookups are not cached.
#[derive(Clone)]
pub struct CachedLookup {
    provider: Arc<dyn LookupProvider>,
    words: Arc<Mutex<HashMap<String, WordEntry>>>,
    sentences: Arc<Mutex<HashMap<String, SentenceEntry>>>,
}

impl CachedLookup {
    #[must_use]
    pub fn new(provider: Arc<dyn LookupProvider>) -> Self {
        Self {
            provider,
            words: Arc::default(),
            sentences: Arc::default(),
        }
    }

    /// # Errors
    ///
    /// Returns `LookupError::EmptyQuery` for a blank query, or the provider's error.
    pub async fn lookup_word(&self, input: &str) -> Result<WordEntry, LookupError> {
        let key = normalized(ItemKind::Word, input)?;
        if let Some(hit) = cached(&self.words, &key)? {
            return Ok(hit);
        }

        let entry = self.provider.lookup_word(&key).await?;
        remember(&self.words, key, entry.clone())?;
        Ok(entry)
    }

    /// # Errors
    ///
    /// Returns `LookupError::EmptyQuery` for a blank query, or the provider's error.
    pub async fn lookup_sentence(&self, input: &str) -> Result<SentenceEntry, LookupError> {
        let key = normalized(ItemKind::Sentence, input)?;
        if let Some(hit) = cached(&self.sentences, &key)? {
            return Ok(hit);
        }

        let entry = self.provider.lookup_sentence(&key).await?;
        remember(&self.sentences, key, entry.clone())?;
        Ok(entry)
    }

    /// Number of cached `(words, sentences)`.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::Cache` if a cache lock is poisoned.
    pub fn cached_counts(&self) -> Result<(usize, usize), LookupError> {
        let words = self.words.lock().map_err(cache_error)?.len();
        let sentences = self.sentences.lock().map_err(cache_error)?.len();
        Ok((words, sentences))
    }
}

fn normalized(kind: ItemKind, input: &str) -> Result<String, LookupError> {
    let key = kind.identity_key(input.trim());
    if key.is_empty() {
        return Err(LookupError::EmptyQuery);
    }
    Ok(key)
}

fn cached<T: Clone>(
    cache: &Mutex<HashMap<String, T>>,
    key: &str,
) -> Result<Option<T>, LookupError> {
    let guard = cache.lock().map_err(cache_error)?;
    Ok(guard.get(key).cloned())
}

fn remember<T>(
    cache: &Mutex<HashMap<String, T>>,
    key: String,
    value: T,
) -> Result<(), LookupError> {
    cache.lock().map_err(cache_error)?.insert(key, value);
    Ok(())
}

fn cache_error<E: std::fmt::Display>(err: E) -> LookupError {
    LookupError::Cache(err.to_string())
}
