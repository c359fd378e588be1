//! The `skillcheck validate` command.

use std::path::PathBuf;

use anyhow::Result;

use skillcheck_core::catalog::{load_catalog, validate_catalog};

pub fn execute(catalog: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = super::config_with_catalog(catalog, config_path.as_deref())?;
    let catalog = load_catalog(&config.catalog)?;

    println!(
        "Catalog: {} ({} questions, {} custom tests, {} users)",
        config.catalog.display(),
        catalog.questions.len(),
        catalog.custom_tests.len(),
        catalog.users.len()
    );

    let warnings = validate_catalog(&catalog);
    for w in &warnings {
        let prefix = w
            .item
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Catalog valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
