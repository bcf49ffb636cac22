//! The `flashvocab status` command.

use anyhow::Result;
use services::AppServices;
use vocab_core::model::MasteryStatus;

pub async fn execute(services: &AppServices) -> Result<()> {
    let library = services.library();
    let due = library.due_counts().await;
    let buckets = library.level_buckets().await;

    println!(
        "Due now: {} ({} words, {} sentences)",
        due.total(),
        due.words,
        due.sentences
    );
    println!("Saved: {}", buckets.total());
    for (level, count, days) in buckets.rows() {
        println!(
            "  level {level} [{}] next in {days}d: {count}",
            MasteryStatus::for_level(level).label()
        );
    }
    Ok(())
}
