//! The `skillcheck init` command.

use std::path::Path;

use anyhow::{Context, Result};

use skillcheck_store::SkillcheckConfig;

pub fn execute() -> Result<()> {
    if Path::new("skillcheck.toml").exists() {
        println!("skillcheck.toml already exists, skipping.");
    } else {
        let config = toml::to_string_pretty(&SkillcheckConfig::default())
            .context("failed to render default config")?;
        std::fs::write("skillcheck.toml", format!("# skillcheck configuration\n\n{config}"))?;
        println!("Created skillcheck.toml");
    }

    let catalog_path = Path::new("catalog.toml");
    if catalog_path.exists() {
        println!("catalog.toml already exists, skipping.");
    } else {
        std::fs::write(catalog_path, EXAMPLE_CATALOG)?;
        println!("Created catalog.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: skillcheck validate --catalog catalog.toml");
    println!("  2. Run: skillcheck take --taker c1 --language JavaScript --level beginner");
    println!("  3. Run: skillcheck results");

    Ok(())
}

const EXAMPLE_CATALOG: &str = r#"# skillcheck catalog

[[questions]]
id = "js-b-1"
language = "JavaScript"
difficulty = "beginner"
prompt = "What does `typeof null` evaluate to?"
options = ["\"null\"", "\"object\"", "\"undefined\""]
correct_answer = 1
estimated_time = 60

[[questions]]
id = "js-b-2"
language = "JavaScript"
difficulty = "beginner"
prompt = "Which keyword declares a block-scoped constant?"
options = ["var", "let", "const"]
correct_answer = 2

[[questions]]
id = "js-b-3"
language = "JavaScript"
difficulty = "beginner"
prompt = "What is logged?"
code = "console.log([1, 2, 3].length);"
options = ["2", "3", "undefined"]
correct_answer = 1

[[custom_tests]]
id = "backend-screen"
company_id = "comp1"
title = "Backend screen"
language = "Python"
difficulty = "intermediate"
invited_candidates = ["c1"]
estimated_duration = 600

[[custom_tests.questions]]
id = "py-i-1"
prompt = "What does `len({})` return?"
options = ["0", "1", "an error"]
correct_answer = 0

[[custom_tests.questions]]
id = "py-i-2"
prompt = "Which type is immutable?"
options = ["list", "dict", "tuple"]
correct_answer = 2

[[users]]
id = "c1"
email = "john@example.com"
name = "John Doe"
role = "candidate"
bio = "Full-stack developer"

[[users.skills]]
language = "JavaScript"
level = "beginner"

[[users]]
id = "comp1"
email = "hr@techcorp.com"
name = "TechCorp"
role = "company"
industry = "Software"
"#;
