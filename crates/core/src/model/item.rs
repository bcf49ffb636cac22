use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::model::review::ReviewState;

//
// ─── ITEM KIND ─────────────────────────────────────────────────────────────────
//

/// Discriminant for the two saved collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Word,
    Sentence,
}

impl ItemKind {
    pub const ALL: [Self; 2] = [Self::Word, Self::Sentence];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Sentence => "sentence",
        }
    }

    /// Normalized identity key used for uniqueness checks.
    ///
    /// Words compare case-insensitively after trimming; sentences compare verbatim.
    #[must_use]
    pub fn identity_key(self, identity: &str) -> String {
        match self {
            Self::Word => identity.trim().to_lowercase(),
            Self::Sentence => identity.to_owned(),
        }
    }

    /// Returns true if two identities name the same item within this collection.
    #[must_use]
    pub fn same_identity(self, a: &str, b: &str) -> bool {
        match self {
            Self::Word => self.identity_key(a) == self.identity_key(b),
            Self::Sentence => a == b,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "word" | "words" => Ok(Self::Word),
            "sentence" | "sentences" => Ok(Self::Sentence),
            _ => Err(ParseError::new("ItemKind", s)),
        }
    }
}

//
// ─── PAYLOADS ──────────────────────────────────────────────────────────────────
//

/// A saved vocabulary lookup result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    pub meaning_vi: String,
    #[serde(default)]
    pub definition_en: String,
    #[serde(default)]
    pub ipa: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syllables: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spelling_tip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
    #[serde(default)]
    pub example_en: String,
    #[serde(default)]
    pub example_vi: String,
    #[serde(default)]
    pub root_word_mnemonic: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub antonyms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub word_family: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collocations: Vec<String>,
    #[serde(flatten)]
    pub review: ReviewState,
}

impl WordEntry {
    /// Minimal entry with the two required fields; everything else is empty.
    #[must_use]
    pub fn new(word: impl Into<String>, meaning_vi: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            meaning_vi: meaning_vi.into(),
            definition_en: String::new(),
            ipa: String::new(),
            syllables: None,
            spelling_tip: None,
            part_of_speech: None,
            example_en: String::new(),
            example_vi: String::new(),
            root_word_mnemonic: String::new(),
            synonyms: Vec::new(),
            antonyms: Vec::new(),
            word_family: Vec::new(),
            collocations: Vec::new(),
            review: ReviewState::default(),
        }
    }

    #[must_use]
    pub fn with_ipa(mut self, ipa: impl Into<String>) -> Self {
        self.ipa = ipa.into();
        self
    }

    #[must_use]
    pub fn with_definition(mut self, definition_en: impl Into<String>) -> Self {
        self.definition_en = definition_en.into();
        self
    }
}

/// An example sentence paired with its translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarSentence {
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub vi: String,
}

/// A saved sentence analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceEntry {
    pub sentence: String,
    pub meaning_vi: String,
    #[serde(default)]
    pub grammar_breakdown: String,
    #[serde(default)]
    pub usage_context: String,
    #[serde(default)]
    pub naturalness_score: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub similar_sentences: Vec<SimilarSentence>,
    #[serde(flatten)]
    pub review: ReviewState,
}

impl SentenceEntry {
    #[must_use]
    pub fn new(sentence: impl Into<String>, meaning_vi: impl Into<String>) -> Self {
        Self {
            sentence: sentence.into(),
            meaning_vi: meaning_vi.into(),
            grammar_breakdown: String::new(),
            usage_context: String::new(),
            naturalness_score: 0.0,
            similar_sentences: Vec::new(),
            review: ReviewState::default(),
        }
    }
}

//
// ─── REVIEWABLE ITEM ───────────────────────────────────────────────────────────
//

/// A saved item of either kind, dispatched by variant rather than field probing.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewableItem {
    Word(WordEntry),
    Sentence(SentenceEntry),
}

impl ReviewableItem {
    #[must_use]
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Word(_) => ItemKind::Word,
            Self::Sentence(_) => ItemKind::Sentence,
        }
    }

    /// The word text or the sentence text verbatim.
    #[must_use]
    pub fn identity(&self) -> &str {
        match self {
            Self::Word(w) => &w.word,
            Self::Sentence(s) => &s.sentence,
        }
    }

    #[must_use]
    pub fn meaning(&self) -> &str {
        match self {
            Self::Word(w) => &w.meaning_vi,
            Self::Sentence(s) => &s.meaning_vi,
        }
    }

    #[must_use]
    pub fn review(&self) -> &ReviewState {
        match self {
            Self::Word(w) => &w.review,
            Self::Sentence(s) => &s.review,
        }
    }

    pub(crate) fn review_mut(&mut self) -> &mut ReviewState {
        match self {
            Self::Word(w) => &mut w.review,
            Self::Sentence(s) => &mut s.review,
        }
    }

    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.review().is_due(now)
    }

    /// True if `identity` names this item under its collection's matching rule.
    #[must_use]
    pub fn has_identity(&self, identity: &str) -> bool {
        self.kind().same_identity(self.identity(), identity)
    }
}

impl From<WordEntry> for ReviewableItem {
    fn from(entry: WordEntry) -> Self {
        Self::Word(entry)
    }
}

impl From<SentenceEntry> for ReviewableItem {
    fn from(entry: SentenceEntry) -> Self {
        Self::Sentence(entry)
    }
}

/// Due predicate over any saved item.
#[must_use]
pub fn is_due(item: &ReviewableItem, now: DateTime<Utc>) -> bool {
    item.is_due(now)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SrsLevel;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn word_identity_ignores_case_sentence_does_not() {
        assert!(ItemKind::Word.same_identity("Apple", " apple "));
        assert!(!ItemKind::Sentence.same_identity("Hello there", "hello there"));
        assert!(ItemKind::Sentence.same_identity("Hello there", "Hello there"));
    }

    #[test]
    fn kind_parses_from_str() {
        assert_eq!("Word".parse::<ItemKind>().unwrap(), ItemKind::Word);
        assert_eq!("sentences".parse::<ItemKind>().unwrap(), ItemKind::Sentence);
        assert!("phrase".parse::<ItemKind>().is_err());
    }

    #[test]
    fn word_entry_decodes_archive_shape() {
        let json = r#"{
            "word": "resilient",
            "meaning_vi": "kiên cường",
            "ipa": "rɪˈzɪl.i.ənt",
            "synonyms": ["tough"],
            "srs_level": 3,
            "next_review": 1700000000000
        }"#;
        let entry: WordEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.word, "resilient");
        assert_eq!(entry.synonyms, vec!["tough".to_string()]);
        assert_eq!(entry.review.srs_level().value(), 3);
        assert_eq!(entry.review.next_review(), Some(fixed_now()));
    }

    #[test]
    fn sentence_entry_serializes_level_and_millis_inline() {
        let mut entry = SentenceEntry::new("How are you?", "Bạn khỏe không?");
        entry.review = ReviewState::fresh(fixed_now());
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["srs_level"], 0);
        assert_eq!(value["next_review"], 1_700_000_000_000_i64);
        assert_eq!(value["date_saved"], 1_700_000_000_000_i64);
        assert_eq!(value["sentence"], "How are you?");
    }

    #[test]
    fn item_dispatches_by_variant() {
        let mut word = WordEntry::new("tree", "cây");
        word.review = ReviewState::from_persisted(
            SrsLevel::NEW,
            Some(fixed_now() + Duration::days(1)),
            None,
        );
        let item = ReviewableItem::from(word);
        assert_eq!(item.kind(), ItemKind::Word);
        assert_eq!(item.identity(), "tree");
        assert!(item.has_identity("TREE"));
        assert!(!is_due(&item, fixed_now()));
        assert!(is_due(&item, fixed_now() + Duration::days(1)));

        let sentence = ReviewableItem::from(SentenceEntry::new("Hi.", "Chào."));
        assert_eq!(sentence.kind(), ItemKind::Sentence);
        assert!(is_due(&sentence, fixed_now()));
    }
}
