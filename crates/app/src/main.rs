//! flashvocab: save English words and sentences, then review them on a
//! spaced-repetition schedule.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use vocab_core::model::{ItemKind, StudyMode, StudyScope};

mod commands;
mod config;

use config::AppConfig;

/// Used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_DIRECTIVES: &str = "flashvocab=info,services=info,storage=warn";

#[derive(Parser)]
#[command(name = "flashvocab", version, about = "Spaced-repetition vocabulary trainer")]
struct Cli {
    /// Database URL or path (overrides config and FLASHVOCAB_DB_URL)
    #[arg(long, global = true)]
    db: Option<String>,

    /// Config file path (default: ./flashvocab.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show due counts and items per level
    Status,

    /// Save a word
    AddWord {
        #[arg(long)]
        word: String,

        /// Vietnamese meaning
        #[arg(long)]
        meaning: String,

        #[arg(long)]
        ipa: Option<String>,

        /// English definition
        #[arg(long)]
        definition: Option<String>,
    },

    /// Save a sentence
    AddSentence {
        #[arg(long)]
        sentence: String,

        /// Vietnamese meaning
        #[arg(long)]
        meaning: String,
    },

    /// Remove a saved word or sentence
    Remove {
        /// word or sentence
        #[arg(long, default_value = "word")]
        kind: ItemKind,

        identity: String,
    },

    /// List saved items
    List {
        /// word or sentence (default: both)
        #[arg(long)]
        kind: Option<ItemKind>,

        /// Only items at this level (4 = mastered)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=4))]
        level: Option<u8>,

        /// Mask meanings for self-testing
        #[arg(long)]
        hide_meaning: bool,
    },

    /// Export the library as CSV
    Export {
        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Review items interactively
    Study {
        /// word, sentence or all
        #[arg(long, default_value = "all")]
        scope: StudyScope,

        /// due or all
        #[arg(long, default_value = "due")]
        mode: StudyMode,
    },

    /// Save a few starter words and sentences
    Seed,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_DIRECTIVES));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("Error: {err:#}");
        process::exit(2);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(cli.config.as_deref(), cli.db.as_deref())?;
    let services = commands::open(&config).await?;

    match cli.command {
        Commands::Status => commands::status::execute(&services).await,
        Commands::AddWord {
            word,
            meaning,
            ipa,
            definition,
        } => commands::library::add_word(&services, word, meaning, ipa, definition).await,
        Commands::AddSentence { sentence, meaning } => {
            commands::library::add_sentence(&services, sentence, meaning).await
        }
        Commands::Remove { kind, identity } => {
            commands::library::remove(&services, kind, &identity).await
        }
        Commands::List {
            kind,
            level,
            hide_meaning,
        } => commands::library::list(&services, kind, level, hide_meaning).await,
        Commands::Export { out } => commands::library::export(&services, out).await,
        Commands::Study { scope, mode } => commands::study::execute(&services, scope, mode).await,
        Commands::Seed => commands::seed::execute(&services).await,
    }
}
