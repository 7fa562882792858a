//! Install command - set up the pre-commit hook.
//!
//! The hook mourns every file staged for deletion and stages the updated
//! graveyard so the obituaries land in the same commit.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use crate::git;

/// Marker line identifying our hook, also inside appended sections.
const HOOK_MARKER: &str = "# code-obituary pre-commit hook";

/// Separator written before our script when appending to a foreign hook.
const APPEND_SEPARATOR: &str = "\n\n# --- code-obituary hook ---\n";

/// Pre-commit hook script content.
const PRE_COMMIT_HOOK: &str = r#"#!/usr/bin/env bash
# code-obituary pre-commit hook
# Automatically generates obituaries for deleted files.

set -e

if ! command -v code-obituary &> /dev/null; then
    echo "[code-obituary] WARNING: code-obituary not found in PATH, skipping hook."
    exit 0
fi

DELETED_FILES=$(git diff --cached --diff-filter=D --name-only)

if [ -z "$DELETED_FILES" ]; then
    exit 0
fi

echo "[code-obituary] Mourning deleted files..."
REPO_ROOT=$(git rev-parse --show-toplevel)

while IFS= read -r filepath; do
    if [ -n "$filepath" ]; then
        echo "[code-obituary] Writing obituary for: $filepath"
        code-obituary mourn "$filepath" --from-git --repo-root "$REPO_ROOT" || true
    fi
done <<< "$DELETED_FILES"

echo "[code-obituary] Obituaries written to GRAVEYARD.md"
if [ -f "$REPO_ROOT/GRAVEYARD.md" ]; then
    git add "$REPO_ROOT/GRAVEYARD.md"
fi
"#;

/// Arguments for the install command.
#[derive(clap::Args)]
pub struct Args {
    /// Path to the repository root
    #[arg(long, value_name = "PATH")]
    pub repo_root: Option<PathBuf>,
}

/// Status of a hook installation attempt.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum InstallStatus {
    /// Hook was freshly written.
    Installed,
    /// Our script was appended to an existing foreign hook.
    Appended,
    /// The hook already contains our script.
    AlreadyInstalled,
}

/// Executes the install command.
pub fn run(args: Args) -> Result<()> {
    let repo_root = match args.repo_root {
        Some(root) => root,
        None => {
            let cwd = std::env::current_dir()?;
            match git::repo_root(&cwd) {
                Some(root) => root,
                None => bail!(
                    "Not inside a git repository. Run this command from within a git repo."
                ),
            }
        }
    };

    let hook_path = git::hooks_dir(&repo_root)?.join("pre-commit");
    let status = install_hook(&hook_path)?;

    match status {
        InstallStatus::Installed => {
            println!("{} {}", "Installed".green(), hook_path.display());
        }
        InstallStatus::Appended => {
            println!(
                "{} {} (appended to existing hook)",
                "Installed".green(),
                hook_path.display()
            );
            println!(
                "{}",
                "Review the combined script; it was joined by plain concatenation.".dimmed()
            );
        }
        InstallStatus::AlreadyInstalled => {
            println!(
                "{} {} (already installed)",
                "Skipped".dimmed(),
                hook_path.display()
            );
        }
    }

    println!();
    println!(
        "Whenever you commit a deletion, code-obituary will write an obituary to {}.",
        "GRAVEYARD.md".cyan()
    );

    Ok(())
}

/// Installs the pre-commit hook at `hook_path`.
///
/// A foreign hook gets our script (minus its shebang) appended after a
/// separator comment. No attempt is made to reconcile the two scripts.
pub(crate) fn install_hook(hook_path: &Path) -> Result<InstallStatus> {
    let status = if hook_path.exists() {
        let existing = fs::read_to_string(hook_path)
            .with_context(|| format!("Failed to read existing hook: {}", hook_path.display()))?;

        if existing.contains(HOOK_MARKER) {
            return Ok(InstallStatus::AlreadyInstalled);
        }

        let mut file = OpenOptions::new()
            .append(true)
            .open(hook_path)
            .with_context(|| format!("Failed to open hook: {}", hook_path.display()))?;
        file.write_all(APPEND_SEPARATOR.as_bytes())?;
        file.write_all(hook_body().as_bytes())?;
        InstallStatus::Appended
    } else {
        fs::write(hook_path, PRE_COMMIT_HOOK)
            .with_context(|| format!("Failed to write hook: {}", hook_path.display()))?;
        InstallStatus::Installed
    };

    make_executable(hook_path)?;
    Ok(status)
}

/// The hook script without its shebang line.
fn hook_body() -> &'static str {
    PRE_COMMIT_HOOK
        .split_once('\n')
        .map(|(_, body)| body)
        .unwrap_or(PRE_COMMIT_HOOK)
}

/// Adds the execute bits on Unix systems.
fn make_executable(hook_path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        let mut perms = fs::metadata(hook_path)?.permissions();
        perms.set_mode(perms.mode() | 0o111);
        fs::set_permissions(hook_path, perms)
            .with_context(|| format!("Failed to set permissions on {}", hook_path.display()))?;
    }
    #[cfg(not(unix))]
    let _ = hook_path;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Creates a temporary git repository and returns its hooks directory.
    fn create_test_repo() -> Result<(TempDir, PathBuf)> {
        let temp_dir = TempDir::new()?;
        git2::Repository::init(temp_dir.path())?;
        let hooks_dir = git::hooks_dir(temp_dir.path())?;
        Ok((temp_dir, hooks_dir))
    }

    #[test]
    fn test_hook_script_shape() {
        assert!(PRE_COMMIT_HOOK.starts_with("#!/usr/bin/env bash\n"));
        assert!(PRE_COMMIT_HOOK.contains(HOOK_MARKER));
        assert!(PRE_COMMIT_HOOK.contains("--diff-filter=D"));
        assert!(PRE_COMMIT_HOOK.contains("code-obituary mourn \"$filepath\" --from-git"));
    }

    #[test]
    fn test_hook_body_drops_shebang_keeps_marker() {
        let body = hook_body();
        assert!(!body.starts_with("#!"));
        assert!(body.starts_with(HOOK_MARKER));
    }

    #[test]
    fn test_install_hook_fresh() -> Result<()> {
        let (_temp_dir, hooks_dir) = create_test_repo()?;
        let hook_path = hooks_dir.join("pre-commit");

        let status = install_hook(&hook_path)?;

        assert_eq!(status, InstallStatus::Installed);
        assert_eq!(fs::read_to_string(&hook_path)?, PRE_COMMIT_HOOK);
        Ok(())
    }

    #[test]
    fn test_install_hook_twice_is_noop() -> Result<()> {
        let (_temp_dir, hooks_dir) = create_test_repo()?;
        let hook_path = hooks_dir.join("pre-commit");

        install_hook(&hook_path)?;
        let status = install_hook(&hook_path)?;

        assert_eq!(status, InstallStatus::AlreadyInstalled);
        assert_eq!(fs::read_to_string(&hook_path)?, PRE_COMMIT_HOOK);
        Ok(())
    }

    #[test]
    fn test_install_hook_appends_to_foreign_hook() -> Result<()> {
        let (_temp_dir, hooks_dir) = create_test_repo()?;
        let hook_path = hooks_dir.join("pre-commit");
        fs::write(&hook_path, "#!/bin/sh\necho 'existing hook'")?;

        let status = install_hook(&hook_path)?;

        assert_eq!(status, InstallStatus::Appended);
        let content = fs::read_to_string(&hook_path)?;
        assert!(content.starts_with("#!/bin/sh\necho 'existing hook'"));
        assert!(content.contains("# --- code-obituary hook ---"));
        assert!(content.contains(HOOK_MARKER));
        assert_eq!(content.matches("#!").count(), 1);

        assert_eq!(install_hook(&hook_path)?, InstallStatus::AlreadyInstalled);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_install_hook_sets_executable() -> Result<()> {
        let (_temp_dir, hooks_dir) = create_test_repo()?;
        let hook_path = hooks_dir.join("pre-commit");

        install_hook(&hook_path)?;

        let mode = fs::metadata(&hook_path)?.permissions().mode();
        assert!(mode & 0o100 != 0, "Hook should be executable");
        Ok(())
    }
}
