//! The `skillcheck take` command.
//!
//! Runs one attempt in the terminal. Commands are read line by line while a
//! [`Countdown`] ticks in the background; whichever event arrives first is
//! applied to the session.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use skillcheck_core::catalog::load_catalog;
use skillcheck_core::engine::TestEngine;
use skillcheck_core::model::{TestDefinition, TestResult};
use skillcheck_core::session::{Advance, TestSession};
use skillcheck_core::timer::Countdown;
use skillcheck_store::{InMemoryResultLog, Stores};

/// Which test to take.
#[derive(Debug, Clone)]
pub enum Target {
    Standard { language: String, level: String },
    Custom(String),
}

/// How an interactive attempt ended.
#[derive(Debug)]
pub enum Outcome {
    Completed(TestResult),
    Abandoned,
}

/// A line of input, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    /// 1-based option number.
    Select(usize),
    Next,
    Previous,
    Finish,
    Quit,
    Help,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    match line.to_lowercase().as_str() {
        "n" | "next" => Command::Next,
        "p" | "prev" | "previous" => Command::Previous,
        "f" | "finish" => Command::Finish,
        "q" | "quit" => Command::Quit,
        "" | "h" | "help" | "?" => Command::Help,
        other => match other.parse::<usize>() {
            Ok(n) => Command::Select(n),
            Err(_) => Command::Unknown(line.to_string()),
        },
    }
}

pub async fn execute(
    catalog: Option<PathBuf>,
    taker: String,
    target: Target,
    results: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = super::config_with_catalog(catalog, config_path.as_deref())?;
    let results_path = results.unwrap_or_else(|| config.results.clone());

    let catalog = load_catalog(&config.catalog)?;
    let log = InMemoryResultLog::load_json(&results_path)?;
    let stores = Stores::with_results(catalog, log)?;

    match stores.users.get(&taker)? {
        Some(user) if user.as_candidate().is_some() => {}
        Some(user) => anyhow::bail!("{taker} is a {}, only candidates take tests", user.role_name()),
        None => anyhow::bail!("unknown candidate: {taker}"),
    }

    let engine = stores.engine().with_config(config.session_config());
    let opened = match &target {
        Target::Standard { language, level } => engine.open_standard(language, level, &taker),
        Target::Custom(id) => engine.open_custom(id, &taker),
    };
    let mut session = match opened {
        Ok(session) => session,
        Err(e) if e.is_unavailable() => anyhow::bail!("test unavailable: {e}"),
        Err(e) => return Err(e.into()),
    };

    let period = Duration::from_millis(config.tick_period_ms.max(1));
    let stdin = BufReader::new(tokio::io::stdin());
    let mut out = std::io::stdout();

    match drive(&engine, &mut session, stdin, &mut out, period).await? {
        Outcome::Completed(result) => {
            print_result(&mut out, session.definition(), &result)?;
            stores.results.save_json(&results_path)?;
            writeln!(out, "Result saved to {}", results_path.display())?;
        }
        Outcome::Abandoned => {
            writeln!(out, "Attempt abandoned. Nothing was recorded.")?;
        }
    }

    Ok(())
}

/// Run `session` to completion against `input`, writing prompts to `out`.
///
/// End of input submits whatever has been answered.
pub async fn drive<R, W>(
    engine: &TestEngine,
    session: &mut TestSession,
    input: R,
    out: &mut W,
    period: Duration,
) -> Result<Outcome>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    session.start()?;
    let (countdown, mut ticks) = Countdown::spawn(period);
    let mut lines = input.lines();

    writeln!(
        out,
        "{}: {} questions, {} to finish. Type `h` for help.",
        session.definition().label(),
        session.question_count(),
        clock(session.total_secs())
    )?;
    render_question(out, session)?;

    let outcome = loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    break Outcome::Completed(engine.finish(session)?);
                };
                match parse_command(&line) {
                    Command::Select(n) => {
                        match n.checked_sub(1).map(|i| session.select_answer(i)) {
                            Some(Ok(())) => render_question(out, session)?,
                            Some(Err(e)) => writeln!(out, "{e}")?,
                            None => writeln!(out, "options are numbered from 1")?,
                        }
                    }
                    Command::Next => match engine.next(session)? {
                        Advance::Moved(_) => render_question(out, session)?,
                        Advance::Finished(finish) => break Outcome::Completed(finish.into_result()),
                    },
                    Command::Previous => {
                        session.previous();
                        render_question(out, session)?;
                    }
                    Command::Finish => break Outcome::Completed(engine.finish(session)?),
                    Command::Quit => break Outcome::Abandoned,
                    Command::Help => print_help(out)?,
                    Command::Unknown(text) => writeln!(out, "unknown command: {text} (type `h` for help)")?,
                }
            }
            tick = ticks.recv() => {
                if tick.is_none() {
                    anyhow::bail!("countdown stopped unexpectedly");
                }
                if let Some(result) = engine.tick(session, 1)? {
                    writeln!(out, "Time is up.")?;
                    break Outcome::Completed(result);
                }
                let remaining = session.remaining_secs();
                if matches!(remaining, 60 | 30 | 10) {
                    writeln!(out, "{} remaining", clock(remaining))?;
                }
            }
        }
    };

    countdown.cancel();
    Ok(outcome)
}

fn render_question<W: Write>(out: &mut W, session: &TestSession) -> Result<()> {
    let question = session.current_question();
    let index = session.current_index();
    let selected = session.answers()[index];

    writeln!(out)?;
    writeln!(
        out,
        "Question {}/{} [{} left, {} answered]",
        index + 1,
        session.question_count(),
        clock(session.remaining_secs()),
        session.answered_count()
    )?;
    writeln!(out, "{}", question.prompt)?;
    if let Some(code) = &question.code {
        for line in code.lines() {
            writeln!(out, "    {line}")?;
        }
    }
    for (i, option) in question.options.iter().enumerate() {
        let marker = if selected == Some(i) { '*' } else { ' ' };
        writeln!(out, " {marker} {}) {option}", i + 1)?;
    }
    Ok(())
}

fn print_help<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "  1..n  select an option")?;
    writeln!(out, "  n     next question (submits on the last one)")?;
    writeln!(out, "  p     previous question")?;
    writeln!(out, "  f     submit now")?;
    writeln!(out, "  q     abandon without recording")?;
    Ok(())
}

fn print_result<W: Write>(out: &mut W, definition: &TestDefinition, result: &TestResult) -> Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "Score: {}% - {} ({} elapsed)",
        result.score,
        if result.passed { "PASSED" } else { "FAILED" },
        clock(result.elapsed_secs)
    )?;
    if let TestDefinition::Standard { language, level, .. } = definition {
        if result.passed {
            writeln!(out, "{language} ({level}) validated.")?;
        } else {
            writeln!(out, "{language} ({level}) not validated.")?;
        }
    }
    Ok(())
}

/// Format seconds as `m:ss`.
fn clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
