//! Append-only markdown log of obituaries.
//!
//! The log is a single human-readable document: a fixed header followed by
//! one `## <filename>` section per obituary, each closed by a `---` rule.
//! Records are only ever appended; listing re-parses the whole file.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::models::{LifecycleMetadata, ObituaryRecord};
use crate::symbols::truncate_chars;

/// Default log file name at the repository root.
pub const GRAVEYARD_FILE: &str = "GRAVEYARD.md";

/// Header written when the log is first created.
pub const GRAVEYARD_HEADER: &str = "# \u{1FAA6} GRAVEYARD.md

*Here lie the fallen code, remembered but no longer needed.*

---
";

/// Text returned by [`read_log`] when the log does not exist.
pub const NO_GRAVEYARD_MESSAGE: &str = "No GRAVEYARD.md found. No code has been mourned yet.";

/// Maximum characters of "last words" kept in a record.
pub const LAST_WORDS_MAX_CHARS: usize = 80;

const SECTION_DELIMITER: &str = "\n## ";
const LIVED_LABEL: &str = "**Lived:**";
const CAUSE_LABEL: &str = "**Cause of death:**";

/// Returns the path of the log inside `repo_root`.
pub fn graveyard_path(repo_root: &Path) -> PathBuf {
    repo_root.join(GRAVEYARD_FILE)
}

/// Creates the log with its header if it does not exist yet.
///
/// An existing file is left untouched, whatever it contains.
pub fn ensure_log(path: &Path) -> io::Result<()> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            tracing::debug!("Creating graveyard at {}", path.display());
            file.write_all(GRAVEYARD_HEADER.as_bytes())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}

/// Renders the markdown section for one obituary.
///
/// Non-blank obituary lines are blockquoted; blank lines become a bare `>`.
pub fn render_record(filename: &str, obituary: &str, metadata: &LifecycleMetadata) -> String {
    let mut entry = String::new();

    entry.push_str(&format!("\n## {filename}\n"));
    entry.push_str(&format!(
        "{LIVED_LABEL} {} \u{2014} {}  \n",
        metadata.born_or_default(),
        metadata.died_or_today()
    ));
    entry.push_str(&format!("{CAUSE_LABEL} {}  \n", metadata.reason_or_default()));

    if let Some(last_words) = metadata.last_words.as_deref().filter(|w| !w.is_empty()) {
        let snippet = truncate_chars(last_words, LAST_WORDS_MAX_CHARS);
        entry.push_str(&format!("**Last words:** `\"{snippet}...\"`\n"));
    }

    entry.push('\n');
    for line in obituary.lines() {
        if line.trim().is_empty() {
            entry.push_str(">\n");
        } else {
            entry.push_str(&format!("> {line}\n"));
        }
    }
    entry.push_str("\n---\n");

    entry
}

/// Appends an obituary to the log, creating the log first if needed.
///
/// Returns exactly the text that was appended.
pub fn append_record(
    path: &Path,
    filename: &str,
    obituary: &str,
    metadata: &LifecycleMetadata,
) -> io::Result<String> {
    ensure_log(path)?;

    let entry = render_record(filename, obituary, metadata);

    let mut file = OpenOptions::new().append(true).open(path)?;
    file.write_all(entry.as_bytes())?;

    tracing::info!("Appended obituary for {} to {}", filename, path.display());
    Ok(entry)
}

/// Parses a log document into records.
///
/// Parsing is best-effort: sections without the expected label lines
/// yield empty fields rather than errors.
pub fn parse_records(document: &str) -> Vec<ObituaryRecord> {
    document
        .split(SECTION_DELIMITER)
        .skip(1)
        .filter_map(parse_section)
        .collect()
}

fn parse_section(section: &str) -> Option<ObituaryRecord> {
    let mut lines = section.lines();
    let filename = lines.next()?.trim().to_string();

    let mut record = ObituaryRecord {
        filename,
        ..Default::default()
    };
    let mut body_parts = Vec::new();

    for line in lines {
        if let Some(value) = line.strip_prefix(LIVED_LABEL) {
            record.lived = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix(CAUSE_LABEL) {
            record.cause = value.trim().to_string();
        } else if let Some(quoted) = line.strip_prefix('>') {
            body_parts.push(quoted.strip_prefix(char::is_whitespace).unwrap_or(quoted));
        }
    }

    record.body = body_parts.join(" ").trim().to_string();
    Some(record)
}

/// Lists every record in the log in insertion order.
///
/// A missing log yields an empty list.
pub fn list_records(path: &Path) -> io::Result<Vec<ObituaryRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let document = fs::read_to_string(path)?;
    Ok(parse_records(&document))
}

/// Returns the raw log text, or a placeholder message when it is missing.
pub fn read_log(path: &Path) -> io::Result<String> {
    if !path.exists() {
        return Ok(NO_GRAVEYARD_MESSAGE.to_string());
    }

    fs::read_to_string(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn metadata(born: &str, died: &str, reason: &str) -> LifecycleMetadata {
        LifecycleMetadata {
            born: Some(born.to_string()),
            died: Some(died.to_string()),
            reason: Some(reason.to_string()),
            last_words: None,
        }
    }

    #[test]
    fn test_ensure_log_creates_header() -> io::Result<()> {
        let dir = TempDir::new()?;
        let path = graveyard_path(dir.path());

        ensure_log(&path)?;

        assert_eq!(fs::read_to_string(&path)?, GRAVEYARD_HEADER);
        Ok(())
    }

    #[test]
    fn test_ensure_log_is_idempotent() -> io::Result<()> {
        let dir = TempDir::new()?;
        let path = graveyard_path(dir.path());

        ensure_log(&path)?;
        let once = fs::read(&path)?;
        ensure_log(&path)?;
        let twice = fs::read(&path)?;

        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn test_ensure_log_keeps_foreign_content() -> io::Result<()> {
        let dir = TempDir::new()?;
        let path = graveyard_path(dir.path());
        fs::write(&path, "hand written notes\n")?;

        ensure_log(&path)?;

        assert_eq!(fs::read_to_string(&path)?, "hand written notes\n");
        Ok(())
    }

    #[test]
    fn test_render_record_layout() {
        let meta = LifecycleMetadata {
            last_words: Some("import os".to_string()),
            ..metadata("2020-01-01", "2024-12-31", "R")
        };
        let entry = render_record("old.py", "Line one.\n\nLine two.", &meta);

        let expected = "\n## old.py\n\
            **Lived:** 2020-01-01 \u{2014} 2024-12-31  \n\
            **Cause of death:** R  \n\
            **Last words:** `\"import os...\"`\n\
            \n\
            > Line one.\n\
            >\n\
            > Line two.\n\
            \n---\n";
        assert_eq!(entry, expected);
    }

    #[test]
    fn test_render_record_defaults() {
        let entry = render_record("x.sh", "Gone.", &LifecycleMetadata::default());
        assert!(entry.contains("**Lived:** unknown \u{2014} "));
        assert!(entry.contains("**Cause of death:** Deleted (cause unknown)  \n"));
        assert!(!entry.contains("Last words"));
    }

    #[test]
    fn test_render_record_blank_reason() {
        let meta = LifecycleMetadata {
            reason: Some(String::new()),
            ..Default::default()
        };
        let entry = render_record("x.sh", "Gone.", &meta);
        assert!(entry.contains("**Cause of death:** Deleted (cause unknown)  \n"));
    }

    #[test]
    fn test_render_record_caps_last_words() {
        let meta = LifecycleMetadata {
            last_words: Some("x".repeat(200)),
            ..Default::default()
        };
        let entry = render_record("a.py", "body", &meta);
        let expected = format!(
            "**Last words:** `\"{}...\"`",
            "x".repeat(LAST_WORDS_MAX_CHARS)
        );
        assert!(entry.contains(&expected));
    }

    #[test]
    fn test_append_returns_exact_text() -> io::Result<()> {
        let dir = TempDir::new()?;
        let path = graveyard_path(dir.path());

        let entry = append_record(&path, "a.py", "Farewell.", &LifecycleMetadata::default())?;

        let content = fs::read_to_string(&path)?;
        assert_eq!(content, format!("{GRAVEYARD_HEADER}{entry}"));
        Ok(())
    }

    #[test]
    fn test_round_trip_single_record() -> io::Result<()> {
        let dir = TempDir::new()?;
        let path = graveyard_path(dir.path());

        append_record(
            &path,
            "utils.py",
            "It helped.\nIt is missed.",
            &metadata("2020-01-01", "2024-12-31", "R"),
        )?;

        let records = list_records(&path)?;
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.filename, "utils.py");
        assert!(record.lived.contains("2020-01-01"));
        assert!(record.lived.contains("2024-12-31"));
        assert!(record.cause.contains('R'));
        assert_eq!(record.body, "It helped. It is missed.");
        Ok(())
    }

    #[test]
    fn test_list_keeps_insertion_order() -> io::Result<()> {
        let dir = TempDir::new()?;
        let path = graveyard_path(dir.path());

        append_record(&path, "first.py", "One.", &LifecycleMetadata::default())?;
        append_record(&path, "second.rs", "Two.", &LifecycleMetadata::default())?;

        let records = list_records(&path)?;
        let names: Vec<_> = records.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["first.py", "second.rs"]);
        Ok(())
    }

    #[test]
    fn test_list_missing_log_is_empty() -> io::Result<()> {
        let dir = TempDir::new()?;
        let records = list_records(&graveyard_path(dir.path()))?;
        assert!(records.is_empty());
        Ok(())
    }

    #[test]
    fn test_read_log_missing() -> io::Result<()> {
        let dir = TempDir::new()?;
        let text = read_log(&graveyard_path(dir.path()))?;
        assert!(text.contains("No GRAVEYARD.md found"));
        Ok(())
    }

    #[test]
    fn test_read_log_verbatim() -> io::Result<()> {
        let dir = TempDir::new()?;
        let path = graveyard_path(dir.path());
        append_record(&path, "a.py", "Bye.", &LifecycleMetadata::default())?;

        assert_eq!(read_log(&path)?, fs::read_to_string(&path)?);
        Ok(())
    }

    #[test]
    fn test_parse_section_without_labels_or_body() {
        let document = "# header\n\n## bare.txt\nsomething unrelated\n";
        let records = parse_records(document);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].filename, "bare.txt");
        assert_eq!(records[0].lived, "");
        assert_eq!(records[0].cause, "");
        assert_eq!(records[0].body, "");
    }

    #[test]
    fn test_parse_blank_quote_lines_do_not_break_body() {
        let document = "\n## a.py\n> first\n>\n> second\n";
        let records = parse_records(document);
        assert_eq!(records[0].body, "first  second");
    }

    #[test]
    fn test_parse_quote_marker_followed_by_tab() {
        let document = "\n## a.py\n>\tindented by tab\n> spaced\n";
        let records = parse_records(document);
        assert_eq!(records[0].body, "indented by tab spaced");
    }
}
