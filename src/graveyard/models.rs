//! Data types stored in and read back from the graveyard log.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Fallback text for an unknown creation date.
pub const UNKNOWN_BORN: &str = "unknown";

/// Fallback text for an unknown cause of death.
pub const UNKNOWN_CAUSE: &str = "Deleted (cause unknown)";

/// Lifecycle details attached to an obituary when it is appended.
///
/// Every field is optional. [`LifecycleMetadata::born_or_default`] and
/// friends supply the text written to the log when a field is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecycleMetadata {
    /// Date of the file's first commit.
    pub born: Option<String>,
    /// Date the file was deleted.
    pub died: Option<String>,
    /// Why the file was deleted.
    pub reason: Option<String>,
    /// First meaningful line of the file.
    pub last_words: Option<String>,
}

impl LifecycleMetadata {
    pub fn born_or_default(&self) -> String {
        self.born.clone().unwrap_or_else(|| UNKNOWN_BORN.to_string())
    }

    /// Today's local date (`YYYY-MM-DD`) when no deletion date is set.
    pub fn died_or_today(&self) -> String {
        self.died.clone().unwrap_or_else(today)
    }

    pub fn reason_or_default(&self) -> String {
        self.reason
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(UNKNOWN_CAUSE)
            .to_string()
    }
}

/// Returns today's local date formatted as `YYYY-MM-DD`.
pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// One obituary as parsed back from the graveyard log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObituaryRecord {
    /// The mourned file, as written in the section heading.
    pub filename: String,
    /// Free-form date range from the "Lived" line.
    pub lived: String,
    /// Free-form text from the "Cause of death" line.
    pub cause: String,
    /// Obituary prose with blockquote lines joined by single spaces.
    pub body: String,
}

impl ObituaryRecord {
    /// Returns the body cut to `max_chars` characters with a trailing
    /// ellipsis when it was longer.
    pub fn excerpt(&self, max_chars: usize) -> String {
        if self.body.chars().count() > max_chars {
            let cut: String = self.body.chars().take(max_chars).collect();
            format!("{cut}...")
        } else {
            self.body.clone()
        }
    }
}
