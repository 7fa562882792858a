//! Mourn command - write an obituary for a deleted file.
//!
//! Gathers the file's content and history, composes an obituary and
//! appends it to the graveyard log at the repository root.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::git;
use crate::graveyard::{
    append_record, graveyard_path, today, LifecycleMetadata, LAST_WORDS_MAX_CHARS,
};
use crate::obituary::generate_obituary;
use crate::symbols::{first_meaningful_line, truncate_chars};

/// Arguments for the mourn command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    code-obituary mourn src/legacy.py                     Mourn a file on disk\n    \
    code-obituary mourn old.sh -r \"Replaced by Makefile\"  Give a cause of death\n    \
    code-obituary mourn old.sh --from-git                 Read content from HEAD\n    \
    code-obituary mourn --staged                          Mourn every staged deletion")]
pub struct Args {
    /// Path to the file to mourn
    #[arg(value_name = "FILEPATH", required_unless_present = "staged")]
    pub filepath: Option<String>,

    /// Cause of death for this file
    #[arg(short, long)]
    pub reason: Option<String>,

    /// Read file content from git HEAD (for use in the pre-commit hook)
    #[arg(long)]
    pub from_git: bool,

    /// Mourn every file staged for deletion (implies --from-git)
    #[arg(long, conflicts_with = "filepath")]
    pub staged: bool,

    /// Path to the repository root
    #[arg(long, value_name = "PATH")]
    pub repo_root: Option<PathBuf>,
}

/// Executes the mourn command.
pub fn run(args: Args) -> Result<()> {
    let repo_root = super::resolve_repo_root(args.repo_root)?;
    let reason = args.reason.filter(|r| !r.trim().is_empty());
    let graveyard = graveyard_path(&repo_root);

    if args.staged {
        let deleted = git::staged_deletions(&repo_root);
        if deleted.is_empty() {
            println!("{}", "No files staged for deletion.".dimmed());
            return Ok(());
        }
        for rel_path in deleted {
            let filepath = repo_root.join(&rel_path).to_string_lossy().to_string();
            mourn_file(&filepath, &repo_root, &graveyard, reason.clone(), true)?;
        }
        return Ok(());
    }

    let Some(filepath) = args.filepath else {
        bail!("Provide a FILEPATH to mourn, or use --staged");
    };
    mourn_file(&filepath, &repo_root, &graveyard, reason, args.from_git)
}

/// Writes one obituary for `filepath` and appends it to `graveyard`.
fn mourn_file(
    filepath: &str,
    repo_root: &Path,
    graveyard: &Path,
    reason: Option<String>,
    from_git: bool,
) -> Result<()> {
    let display_name = display_name(Path::new(filepath), repo_root);
    let content = load_content(filepath, &display_name, repo_root, from_git)?;

    let (born, last_touched) = git::lifecycle_dates(repo_root, &display_name);
    let died = last_touched.unwrap_or_else(today);

    let last_words = first_meaningful_line(&content, &["#", "//"])
        .map(|line| truncate_chars(line, LAST_WORDS_MAX_CHARS).to_string());

    println!("{} {}...", "Mourning".yellow().bold(), display_name);
    println!("{}", "Generating obituary...".dimmed());

    let obituary = generate_obituary(
        &display_name,
        &content,
        reason.as_deref(),
        born.as_deref(),
        Some(&died),
    );

    let metadata = LifecycleMetadata {
        born,
        died: Some(died),
        reason,
        last_words,
    };

    let entry = append_record(graveyard, &display_name, &obituary, &metadata)
        .with_context(|| format!("Failed to write {}", graveyard.display()))?;

    println!();
    println!("{}", "Obituary written:".green().bold());
    println!("{entry}");
    println!("{}", format!("Appended to {}", graveyard.display()).dimmed());

    Ok(())
}

/// Finds the file's content: from HEAD when asked, then from disk, then a
/// placeholder.
fn load_content(
    filepath: &str,
    display_name: &str,
    repo_root: &Path,
    from_git: bool,
) -> Result<String> {
    if from_git {
        let from_head = git::content_at_revision(repo_root, "HEAD", display_name)
            .or_else(|| git::content_at_revision(repo_root, "HEAD", filepath));
        if let Some(content) = from_head {
            return Ok(content);
        }
    }

    let path = Path::new(filepath);
    if path.exists() {
        let bytes =
            fs::read(path).with_context(|| format!("Error reading file: {filepath}"))?;
        return Ok(String::from_utf8_lossy(&bytes).into_owned());
    }

    println!(
        "{}",
        format!("Warning: Could not read file content for {filepath}. Using placeholder.")
            .yellow()
    );
    Ok(format!("# {display_name}\n# (content not available)\n"))
}

/// Returns `filepath` relative to `repo_root` when it lies inside it,
/// otherwise the path as given.
fn display_name(filepath: &Path, repo_root: &Path) -> String {
    let absolute = if filepath.is_absolute() {
        filepath.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(filepath),
            Err(_) => return filepath.to_string_lossy().to_string(),
        }
    };

    let root = repo_root
        .canonicalize()
        .unwrap_or_else(|_| repo_root.to_path_buf());
    let absolute = canonicalize_parent(&absolute);

    absolute
        .strip_prefix(&root)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| filepath.to_string_lossy().to_string())
}

/// Canonicalizes the parent directory so paths to deleted files still
/// resolve symlinks the same way the repository root does.
fn canonicalize_parent(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|p| p.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}
