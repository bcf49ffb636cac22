//! The `flashvocab study` command: an interactive review loop.

use std::io::{BufRead, Write};

use anyhow::Result;
use services::{AppServices, SessionEngine, SessionError, StudyStart};
use vocab_core::model::{ReviewGrade, StudyMode, StudyScope};

pub async fn execute(services: &AppServices, scope: StudyScope, mode: StudyMode) -> Result<()> {
    let mut engine = services.session_engine();
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut out = std::io::stdout();
    run_session(&mut engine, scope, mode, &mut input, &mut out).await
}

/// Drive one session, reading answers from `input`.
///
/// End of input behaves like `q`.
pub async fn run_session<R: BufRead, W: Write>(
    engine: &mut SessionEngine,
    scope: StudyScope,
    mode: StudyMode,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    match engine.start_study(scope, mode).await? {
        StudyStart::Empty => {
            writeln!(out, "Nothing to study right now.")?;
            return Ok(());
        }
        StudyStart::Started { total, .. } => {
            writeln!(
                out,
                "Studying {total} item(s). Press Enter to reveal, \
                 then answer y (correct), n (incorrect) or q (quit)."
            )?;
        }
    }

    while let Some(item) = engine.current_item() {
        let (kind, identity, meaning) = (
            item.kind(),
            item.identity().to_owned(),
            item.meaning().to_owned(),
        );
        let (position, total) = engine
            .progress()
            .map_or((1, 1), |p| (p.position(), p.total));

        writeln!(out, "\n[{position}/{total}] {kind}: {identity}")?;
        if prompt(input, out, "(Enter to reveal) ")?.is_none() {
            return stop(engine, out);
        }
        writeln!(out, "  = {meaning}")?;

        let grade = loop {
            let Some(answer) = prompt(input, out, "Correct? [y/n/q] ")? else {
                return stop(engine, out);
            };
            match ReviewGrade::from_answer(&answer) {
                Ok(grade) => break grade,
                Err(_) => writeln!(out, "Please answer y, n or q.")?,
            }
        };

        let result = match engine.grade_current(grade).await {
            Ok(result) => result,
            Err(SessionError::Storage(err)) => {
                writeln!(out, "Could not save this answer ({err}). Answer again to retry.")?;
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let applied = &result.review.applied;
        writeln!(
            out,
            "  level {} -> {}, next review in {}d",
            applied.previous_level, applied.scheduled.level, applied.scheduled.interval_days
        )?;
        if let Some(summary) = &result.summary {
            writeln!(
                out,
                "\nSession complete: {} correct, {} incorrect.",
                summary.correct(),
                summary.incorrect()
            )?;
        }
    }

    Ok(())
}

/// Print `message` and read one line. `None` means quit.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    message: &str,
) -> Result<Option<String>> {
    write!(out, "{message}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") {
        return Ok(None);
    }
    Ok(Some(line.to_owned()))
}

fn stop<W: Write>(engine: &mut SessionEngine, out: &mut W) -> Result<()> {
    let dropped = engine.abandon();
    writeln!(out, "\nStopped. {dropped} item(s) left for later.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::SessionState;
    use std::io::Cursor;
    use vocab_core::model::{SrsLevel, WordEntry};
    use vocab_core::scheduler::Scheduler;
    use vocab_core::time::fixed_clock;

    async fn services_with(words: &[&str]) -> AppServices {
        let services = AppServices::in_memory(fixed_clock(), Scheduler::new());
        for word in words {
            services
                .library()
                .save_word(WordEntry::new(*word, "nghĩa"))
                .await
                .unwrap();
        }
        services
    }

    async fn run(services: &AppServices, answers: &str) -> (String, SessionEngine) {
        let mut engine = services.session_engine();
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut out = Vec::new();
        run_session(&mut engine, StudyScope::All, StudyMode::Due, &mut input, &mut out)
            .await
            .unwrap();
        (String::from_utf8(out).unwrap(), engine)
    }

    #[tokio::test]
    async fn empty_queue_prints_notice() {
        let services = services_with(&[]).await;
        let (out, engine) = run(&services, "").await;
        assert!(out.contains("Nothing to study"));
        assert_eq!(engine.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn answers_grade_every_item() {
        let services = services_with(&["one", "two"]).await;
        let (out, engine) = run(&services, "\ny\n\nmaybe\nn\n").await;

        assert!(out.contains("Studying 2 item(s)"));
        assert!(out.contains("Please answer y, n or q."));
        assert!(out.contains("Session complete: 1 correct, 1 incorrect."));
        assert_eq!(engine.state(), SessionState::Completed);

        let levels: Vec<_> = services
            .store()
            .load_words()
            .await
            .iter()
            .map(|w| w.review.srs_level())
            .collect();
        assert!(levels.contains(&SrsLevel::clamped(1)));
        assert!(levels.contains(&SrsLevel::NEW));
    }

    #[tokio::test]
    async fn quitting_abandons_the_rest() {
        let services = services_with(&["a", "b", "c"]).await;
        let (out, engine) = run(&services, "\ny\nq\n").await;

        assert!(out.contains("Stopped. 2 item(s) left for later."));
        assert_eq!(engine.state(), SessionState::Idle);
        assert_eq!(services.library().due_counts().await.words, 2);
    }

    #[tokio::test]
    async fn end_of_input_stops_cleanly() {
        let services = services_with(&["a"]).await;
        let (out, _) = run(&services, "\n").await;
        assert!(out.contains("Stopped. 1 item(s) left for later."));
    }
}
