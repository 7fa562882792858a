//! Git integration.
//!
//! Answers the history questions an obituary needs: when a file first and
//! last appeared in a commit, what it contained at a revision, and which
//! files are staged for deletion. Lookups never fail outward; errors are
//! logged and reported as missing values.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use git2::{Commit, Delta, DiffFindOptions, Oid, Repository, Sort};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Upper bound on time spent walking history for one file.
const HISTORY_TIMEOUT: Duration = Duration::from_secs(5);

/// Returns the working directory of the repository containing `path`.
pub fn repo_root(path: &Path) -> Option<PathBuf> {
    let repo = Repository::discover(path).ok()?;
    repo.workdir().map(Path::to_path_buf)
}

/// Returns the dates (`YYYY-MM-DD`) of the oldest and newest commits that
/// changed `rel_path`, as `(born, last_touched)`.
///
/// Both values are `None` when the repository cannot be read or the file
/// has no history. Renames are followed along first parents, so a moved
/// file keeps the birth date of its original name. The walk stops after
/// [`HISTORY_TIMEOUT`] and reports what it found by then.
pub fn lifecycle_dates(repo_root: &Path, rel_path: &str) -> (Option<String>, Option<String>) {
    match walk_file_history(repo_root, Path::new(rel_path), HISTORY_TIMEOUT) {
        Ok(dates) => dates,
        Err(e) => {
            tracing::debug!("Could not read history for {rel_path}: {e:#}");
            (None, None)
        }
    }
}

fn walk_file_history(
    repo_root: &Path,
    rel_path: &Path,
    timeout: Duration,
) -> Result<(Option<String>, Option<String>)> {
    let repo = Repository::open(repo_root).context("Not a git repository")?;
    let deadline = Instant::now() + timeout;

    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TIME)?;
    revwalk.push_head().context("Repository has no commits")?;

    let mut path = rel_path.to_path_buf();
    let mut newest = None;
    let mut oldest = None;

    for oid in revwalk {
        if Instant::now() > deadline {
            tracing::warn!(
                "History lookup for {} timed out after {:?}",
                rel_path.display(),
                timeout
            );
            break;
        }

        let commit = repo.find_commit(oid?)?;
        if touches_path(&commit, &path)? {
            let date = commit_date(&commit);
            if newest.is_none() {
                newest = date.clone();
            }
            oldest = date;

            if let Some(previous) = renamed_from(&repo, &commit, &path)? {
                tracing::debug!(
                    "Following rename {} -> {}",
                    previous.display(),
                    path.display()
                );
                path = previous;
            }
        }
    }

    Ok((oldest, newest))
}

/// Returns true when `commit` changed `path` relative to its first parent.
fn touches_path(commit: &Commit, path: &Path) -> Result<bool> {
    let current = entry_id(commit, path)?;
    let previous = match commit.parent(0) {
        Ok(parent) => entry_id(&parent, path)?,
        Err(_) => None,
    };
    Ok(current != previous)
}

/// Returns the old name of `path` when `commit` created it by renaming a
/// file that existed in the first parent.
fn renamed_from(repo: &Repository, commit: &Commit, path: &Path) -> Result<Option<PathBuf>> {
    let Ok(parent) = commit.parent(0) else {
        return Ok(None);
    };
    if entry_id(&parent, path)?.is_some() {
        return Ok(None);
    }

    let mut diff = repo.diff_tree_to_tree(Some(&parent.tree()?), Some(&commit.tree()?), None)?;
    let mut find = DiffFindOptions::new();
    find.renames(true);
    diff.find_similar(Some(&mut find))?;

    let previous = diff
        .deltas()
        .filter(|delta| delta.status() == Delta::Renamed)
        .find(|delta| delta.new_file().path() == Some(path))
        .and_then(|delta| delta.old_file().path().map(Path::to_path_buf));
    Ok(previous)
}

fn entry_id(commit: &Commit, path: &Path) -> Result<Option<Oid>> {
    let tree = commit.tree()?;
    Ok(tree.get_path(path).ok().map(|entry| entry.id()))
}

/// Formats the author date in the author's own timezone.
fn commit_date(commit: &Commit) -> Option<String> {
    let when = commit.author().when();
    let offset = FixedOffset::east_opt(when.offset_minutes() * 60)?;
    DateTime::from_timestamp(when.seconds(), 0)
        .map(|dt| dt.with_timezone(&offset).format("%Y-%m-%d").to_string())
}

/// Returns the text of `rel_path` at `reference` (e.g. `HEAD`).
///
/// `None` when the revision or path does not exist or the blob is binary.
pub fn content_at_revision(repo_root: &Path, reference: &str, rel_path: &str) -> Option<String> {
    match read_blob(repo_root, reference, Path::new(rel_path)) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!("Could not read {rel_path} at {reference}: {e:#}");
            None
        }
    }
}

fn read_blob(repo_root: &Path, reference: &str, rel_path: &Path) -> Result<Option<String>> {
    let repo = Repository::open(repo_root).context("Not a git repository")?;
    let tree = repo
        .revparse_single(reference)
        .with_context(|| format!("Could not resolve {reference}"))?
        .peel_to_tree()?;

    let entry = tree
        .get_path(rel_path)
        .with_context(|| format!("{} not found at {reference}", rel_path.display()))?;
    let blob = entry.to_object(&repo)?.peel_to_blob()?;

    if blob.is_binary() {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(blob.content()).into_owned()))
}

/// Lists files staged for deletion (deleted in the index relative to HEAD).
pub fn staged_deletions(repo_root: &Path) -> Vec<String> {
    match read_staged_deletions(repo_root) {
        Ok(paths) => paths,
        Err(e) => {
            tracing::debug!("Could not list staged deletions: {e:#}");
            Vec::new()
        }
    }
}

fn read_staged_deletions(repo_root: &Path) -> Result<Vec<String>> {
    let repo = Repository::open(repo_root).context("Not a git repository")?;
    let head_tree = repo.head()?.peel_to_tree()?;
    let diff = repo.diff_tree_to_index(Some(&head_tree), None, None)?;

    Ok(diff
        .deltas()
        .filter(|delta| delta.status() == Delta::Deleted)
        .filter_map(|delta| delta.old_file().path())
        .map(|p| p.to_string_lossy().to_string())
        .collect())
}

/// Gets the path to the git hooks directory, creating it if missing.
pub fn hooks_dir(repo_root: &Path) -> Result<PathBuf> {
    let repo = Repository::discover(repo_root).context(
        "Not in a git repository. Run this command from within a git repository.",
    )?;

    let hooks_dir = repo.path().join("hooks");
    if !hooks_dir.exists() {
        fs::create_dir_all(&hooks_dir).with_context(|| {
            format!("Failed to create hooks directory: {}", hooks_dir.display())
        })?;
    }

    Ok(hooks_dir)
}
