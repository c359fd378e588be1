//! The `skillcheck list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use skillcheck_core::catalog::load_catalog;
use skillcheck_core::model::SkillLevel;

pub fn execute(catalog: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = super::config_with_catalog(catalog, config_path.as_deref())?;
    let catalog = load_catalog(&config.catalog)?;
    let counts = catalog.question_counts();

    if counts.is_empty() {
        println!("No standard questions in {}.", config.catalog.display());
    } else {
        let mut table = Table::new();
        let mut header = vec!["Language".to_string()];
        header.extend(SkillLevel::ALL.iter().map(|l| l.to_string()));
        table.set_header(header);

        let mut languages: Vec<_> = counts.keys().map(|(language, _)| *language).collect();
        languages.dedup();
        for language in languages {
            let mut row = vec![Cell::new(language)];
            for level in SkillLevel::ALL {
                let n = counts.get(&(language, level)).copied().unwrap_or(0);
                row.push(Cell::new(n));
            }
            table.add_row(row);
        }
        println!("{table}");
    }

    if !catalog.custom_tests.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Custom test", "Title", "Language", "Level", "Questions", "Invited"]);
        for t in &catalog.custom_tests {
            table.add_row(vec![
                Cell::new(&t.id),
                Cell::new(&t.title),
                Cell::new(t.language),
                Cell::new(t.difficulty),
                Cell::new(t.questions.len()),
                Cell::new(t.invited_candidates.len()),
            ]);
        }
        println!("{table}");
    }

    Ok(())
}
