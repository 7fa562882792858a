//! View command - print the graveyard log.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::graveyard::{graveyard_path, read_log};

/// Arguments for the view command.
#[derive(clap::Args)]
pub struct Args {
    /// Path to the repository root
    #[arg(long, value_name = "PATH")]
    pub repo_root: Option<PathBuf>,
}

/// Executes the view command.
pub fn run(args: Args) -> Result<()> {
    let repo_root = super::resolve_repo_root(args.repo_root)?;
    let graveyard = graveyard_path(&repo_root);

    if !graveyard.exists() {
        let message = read_log(&graveyard)?;
        println!("{}", message.yellow());
        return Ok(());
    }

    let content = read_log(&graveyard)
        .with_context(|| format!("Failed to read {}", graveyard.display()))?;
    for line in content.lines() {
        println!("{}", highlight_line(line));
    }

    Ok(())
}

/// Light terminal styling for the markdown structure of the log.
fn highlight_line(line: &str) -> String {
    if line.starts_with("# ") || line.starts_with("## ") {
        line.bold().cyan().to_string()
    } else if line.starts_with("**") {
        line.magenta().to_string()
    } else if line.starts_with('>') {
        line.italic().to_string()
    } else if line == "---" {
        line.dimmed().to_string()
    } else {
        line.to_string()
    }
}
