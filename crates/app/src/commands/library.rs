//! Library commands: add, remove, list and export.

use std::path::PathBuf;

use anyhow::{Context, Result};
use services::AppServices;
use vocab_core::model::{
    ItemKind, MasteryStatus, ReviewableItem, SentenceEntry, SrsLevel, WordEntry,
};

pub async fn add_word(
    services: &AppServices,
    word: String,
    meaning: String,
    ipa: Option<String>,
    definition: Option<String>,
) -> Result<()> {
    let mut entry = WordEntry::new(word, meaning);
    if let Some(ipa) = ipa {
        entry = entry.with_ipa(ipa);
    }
    if let Some(definition) = definition {
        entry = entry.with_definition(definition);
    }
    let display = entry.word.trim().to_string();

    services.library().save_word(entry).await?;
    println!("Saved word: {display}");
    Ok(())
}

pub async fn add_sentence(services: &AppServices, sentence: String, meaning: String) -> Result<()> {
    let entry = SentenceEntry::new(sentence, meaning);
    let display = entry.sentence.trim().to_string();

    services.library().save_sentence(entry).await?;
    println!("Saved sentence: {display}");
    Ok(())
}

pub async fn remove(services: &AppServices, kind: ItemKind, identity: &str) -> Result<()> {
    if services.library().remove(kind, identity).await? {
        println!("Removed {kind}: {}", identity.trim());
    } else {
        println!("No saved {kind} matches {:?}", identity.trim());
    }
    Ok(())
}

pub async fn list(
    services: &AppServices,
    kind: Option<ItemKind>,
    level: Option<u8>,
    hide_meaning: bool,
) -> Result<()> {
    let level = level.and_then(SrsLevel::new);
    let kinds = kind.map_or(ItemKind::ALL.to_vec(), |k| vec![k]);
    let library = services.library();

    let mut shown = 0;
    for kind in kinds {
        for item in library.list(kind, level).await {
            println!("{}", format_row(&item, hide_meaning));
            shown += 1;
        }
    }
    if shown == 0 {
        println!("No saved items.");
    }
    Ok(())
}

pub async fn export(services: &AppServices, out: Option<PathBuf>) -> Result<()> {
    let csv = services.library().export_csv().await?;
    match out {
        Some(path) => {
            std::fs::write(&path, csv)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}

fn format_row(item: &ReviewableItem, hide_meaning: bool) -> String {
    let level = item.review().srs_level();
    let meaning = if hide_meaning { "•••" } else { item.meaning() };
    format!(
        "{:<8} L{level} {:<13} {} = {meaning}",
        item.kind().as_str(),
        MasteryStatus::for_level(level).label(),
        item.identity(),
    )
}
