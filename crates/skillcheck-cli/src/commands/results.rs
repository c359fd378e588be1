//! The `skillcheck results` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use skillcheck_core::model::{Language, TestResult};
use skillcheck_core::statistics::summarize;
use skillcheck_core::traits::ResultLog;
use skillcheck_store::{load_config_from, InMemoryResultLog};

pub fn execute(
    results: Option<PathBuf>,
    taker: Option<String>,
    language: Option<String>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let path = results.unwrap_or(config.results);
    let language: Option<Language> = language
        .map(|l| l.parse())
        .transpose()
        .context("invalid --language")?;

    let log = InMemoryResultLog::load_json(&path)?;
    let selected: Vec<TestResult> = match (taker.as_deref(), language) {
        (Some(taker), language) => log
            .query_by_taker(taker)?
            .into_iter()
            .filter(|r| language.is_none_or(|l| r.language == l))
            .collect(),
        (None, Some(language)) => log.query_by_language(language)?,
        (None, None) => log.all()?,
    };

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&selected)?);
        }
        "table" => print_tables(&selected),
        other => anyhow::bail!("unknown format: {other}"),
    }

    Ok(())
}

fn print_tables(results: &[TestResult]) {
    if results.is_empty() {
        println!("No results.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Taker", "Test", "Level", "Score", "Result", "Time", "Finished",
    ]);
    for r in results {
        let test = match &r.custom_test_id {
            Some(id) => format!("{} ({id})", r.language),
            None => r.language.to_string(),
        };
        table.add_row(vec![
            Cell::new(&r.taker_id),
            Cell::new(test),
            Cell::new(r.level),
            Cell::new(format!("{}%", r.score)),
            Cell::new(if r.passed { "PASS" } else { "FAIL" }),
            Cell::new(format!("{}s", r.elapsed_secs)),
            Cell::new(r.ended_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    println!("{table}");

    let summary = summarize(results);
    let mut table = Table::new();
    table.set_header(vec!["Language", "Attempts", "Passed", "Pass rate", "Avg", "Best"]);
    for (language, stats) in &summary.per_language {
        table.add_row(vec![
            Cell::new(language),
            Cell::new(stats.attempts),
            Cell::new(stats.passed),
            Cell::new(format!("{:.1}%", stats.pass_rate * 100.0)),
            Cell::new(format!("{:.1}", stats.avg_score)),
            Cell::new(stats.best_score),
        ]);
    }
    println!("{table}");
}
