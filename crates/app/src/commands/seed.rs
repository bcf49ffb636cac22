//! The `flashvocab seed` command.

use anyhow::Result;
use services::{AppServices, LibraryError};
use vocab_core::model::{SentenceEntry, WordEntry};

fn starter_words() -> Vec<WordEntry> {
    vec![
        WordEntry::new("resilient", "kiên cường")
            .with_ipa("rɪˈzɪliənt")
            .with_definition("able to recover quickly from difficulty"),
        WordEntry::new("curious", "tò mò")
            .with_ipa("ˈkjʊriəs")
            .with_definition("wanting to know or learn something"),
        WordEntry::new("grateful", "biết ơn")
            .with_ipa("ˈɡreɪtfl")
            .with_definition("feeling thankful"),
    ]
}

fn starter_sentences() -> Vec<SentenceEntry> {
    vec![
        SentenceEntry::new("Practice makes perfect.", "Có công mài sắt, có ngày nên kim."),
        SentenceEntry::new("Better late than never.", "Muộn còn hơn không."),
    ]
}

pub async fn execute(services: &AppServices) -> Result<()> {
    let library = services.library();
    let (mut added, mut skipped) = (0, 0);

    for word in starter_words() {
        match library.save_word(word).await {
            Ok(()) => added += 1,
            Err(LibraryError::AlreadySaved { .. }) => skipped += 1,
            Err(err) => return Err(err.into()),
        }
    }
    for sentence in starter_sentences() {
        match library.save_sentence(sentence).await {
            Ok(()) => added += 1,
            Err(LibraryError::AlreadySaved { .. }) => skipped += 1,
            Err(err) => return Err(err.into()),
        }
    }

    tracing::info!(added, skipped, "seeded library");
    println!("Seeded {added} item(s), {skipped} already saved.");
    Ok(())
}
