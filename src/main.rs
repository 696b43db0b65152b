use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use docsel::config::{load_from_path, EngineConfig};
use docsel::{LocatorParser, MemoryDocument, SelectorEngine, SelectorError};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;

#[derive(Parser)]
#[command(name = "docsel")]
#[command(about = "Parse and resolve document locators", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a locator and print its canonical form
    Parse {
        locator: String,

        /// Require paragraph and table locators to narrow their target
        #[arg(long)]
        strict: bool,

        /// Print the structured form as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a locator against a JSON document
    Select {
        /// Document description (JSON)
        #[arg(short, long)]
        document: PathBuf,

        locator: String,

        /// Fail unless exactly one object matches
        #[arg(long)]
        single: bool,

        /// Engine config (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the selection description as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Parse {
            locator,
            strict,
            json,
        } => cmd_parse(&locator, strict, json),
        Commands::Select {
            document,
            locator,
            single,
            config,
            json,
        } => cmd_select(&document, &locator, single, config.as_deref(), json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_parse(input: &str, strict: bool, json: bool) -> Result<()> {
    let locator = LocatorParser::new().strict(strict).parse(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&locator)?);
    } else {
        println!("{}", locator.canonical().green());
    }
    Ok(())
}

fn cmd_select(
    document: &Path,
    locator: &str,
    single: bool,
    config: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = match config {
        Some(path) => load_from_path(path)?,
        None => EngineConfig::default(),
    };

    let contents = fs::read_to_string(document)
        .with_context(|| format!("failed to read document {}", document.display()))?;
    let doc = MemoryDocument::from_json(&contents)
        .with_context(|| format!("invalid document {}", document.display()))?;

    let mut engine = SelectorEngine::with_config(&config);
    let selection = match engine.select(&doc, locator, single) {
        Ok(selection) => selection,
        Err(SelectorError::Syntax(err)) => {
            for issue in &err.issues {
                eprintln!("  {} {}", "-".yellow(), issue);
            }
            anyhow::bail!("invalid locator '{locator}'");
        }
        Err(err) => return Err(err.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&selection.describe())?);
        return Ok(());
    }

    println!(
        "{} {} match(es) in {}",
        "✓".green(),
        selection.len(),
        selection.document_id()
    );
    for range in selection.ranges() {
        println!(
            "  {:<12} [{}, {})  {}",
            range.kind.to_string().cyan(),
            range.start,
            range.end,
            range.text.replace('\n', "\\n").dimmed()
        );
    }
    for warning in selection.warnings() {
        println!("  {} {}", "warning:".yellow(), warning);
    }
    Ok(())
}
