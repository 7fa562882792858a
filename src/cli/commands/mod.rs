//! CLI commands for code-obituary.
//!
//! Each submodule implements a single CLI command with its argument
//! parsing and execution logic.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::git;

/// Shell completion script generation.
pub mod completions;

/// Configuration viewing and management.
pub mod config;

/// Install the pre-commit hook.
pub mod install;

/// List obituaries as a table.
pub mod list;

/// Write an obituary for a file.
pub mod mourn;

/// Print the graveyard log.
pub mod view;

/// Resolves the repository root: explicit flag, then git discovery from
/// the current directory, then the current directory itself.
pub(crate) fn resolve_repo_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(root) = explicit {
        return Ok(root);
    }

    let cwd = std::env::current_dir().context("Could not determine current directory")?;
    Ok(git::repo_root(&cwd).unwrap_or(cwd))
}
