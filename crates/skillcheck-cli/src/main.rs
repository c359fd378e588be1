//! skillcheck CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "skillcheck", version, about = "Timed skill validation tests")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and example catalog
    Init,

    /// Validate catalog TOML files
    Validate {
        /// Path to catalog file or directory
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// List question counts per language and level
    List {
        /// Path to catalog file or directory
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Take a test interactively
    Take {
        /// Path to catalog file or directory
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Id of the candidate taking the test
        #[arg(long)]
        taker: String,

        /// Language of a standard test (e.g. "Rust", "C#")
        #[arg(long, requires = "level", conflicts_with = "custom")]
        language: Option<String>,

        /// Level of a standard test (beginner, intermediate, advanced, expert)
        #[arg(long, requires = "language")]
        level: Option<String>,

        /// Id of a custom test
        #[arg(long)]
        custom: Option<String>,

        /// Result log JSON to append to
        #[arg(long)]
        results: Option<PathBuf>,
    },

    /// Show recorded results
    Results {
        /// Result log JSON
        #[arg(long)]
        results: Option<PathBuf>,

        /// Only show this taker
        #[arg(long)]
        taker: Option<String>,

        /// Only show this language
        #[arg(long)]
        language: Option<String>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "skillcheck=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { catalog } => commands::validate::execute(catalog, config),
        Commands::List { catalog } => commands::list::execute(catalog, config),
        Commands::Take {
            catalog,
            taker,
            language,
            level,
            custom,
            results,
        } => {
            let target = match (custom, language, level) {
                (Some(id), _, _) => commands::take::Target::Custom(id),
                (None, Some(language), Some(level)) => {
                    commands::take::Target::Standard { language, level }
                }
                _ => {
                    eprintln!("Error: pass either --custom <ID> or --language <L> --level <V>");
                    process::exit(2);
                }
            };
            commands::take::execute(catalog, taker, target, results, config).await
        }
        Commands::Results {
            results,
            taker,
            language,
            format,
        } => commands::results::execute(results, taker, language, format, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
