//! List command - show every obituary in the graveyard.
//!
//! Prints a table of mourned files with their lifetimes, causes of death
//! and an excerpt of the obituary, or the records as JSON.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::cli::OutputFormat;
use crate::graveyard::{graveyard_path, list_records, ObituaryRecord};

/// Characters of the obituary body shown in the table.
const EXCERPT_CHARS: usize = 80;

/// Arguments for the list command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    code-obituary list                 Table of all obituaries\n    \
    code-obituary list --format json   Output as JSON")]
pub struct Args {
    /// Path to the repository root
    #[arg(long, value_name = "PATH")]
    pub repo_root: Option<PathBuf>,

    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Executes the list command.
pub fn run(args: Args) -> Result<()> {
    let repo_root = super::resolve_repo_root(args.repo_root)?;
    let graveyard = graveyard_path(&repo_root);

    let records = list_records(&graveyard)
        .with_context(|| format!("Failed to read {}", graveyard.display()))?;

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&records)?;
            println!("{json}");
        }
        OutputFormat::Text => print_table(&records),
    }

    Ok(())
}

fn print_table(records: &[ObituaryRecord]) {
    if records.is_empty() {
        println!("{}", "No obituaries found. The graveyard is empty.".yellow());
        return;
    }

    // Column widths for consistent alignment
    const FILE_WIDTH: usize = 28;
    const LIVED_WIDTH: usize = 25;
    const CAUSE_WIDTH: usize = 28;

    println!("{}", "Code Graveyard".bold());
    println!();
    println!(
        "{}",
        format!(
            "{:<FILE_WIDTH$}  {:<LIVED_WIDTH$}  {:<CAUSE_WIDTH$}  {}",
            "FILE", "LIVED", "CAUSE OF DEATH", "OBITUARY"
        )
        .bold()
    );

    for record in records {
        println!(
            "{}  {}  {}  {}",
            pad(&record.filename, FILE_WIDTH).cyan(),
            pad(&record.lived, LIVED_WIDTH).magenta(),
            pad(&record.cause, CAUSE_WIDTH).red(),
            record.excerpt(EXCERPT_CHARS).dimmed()
        );
    }

    println!();
    println!(
        "{}",
        format!("Total: {} obituary(ies)", records.len()).dimmed()
    );
}

/// Pads or truncates `text` to exactly `width` characters.
fn pad(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count > width {
        let cut: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        format!("{text}{}", " ".repeat(width - count))
    }
}
