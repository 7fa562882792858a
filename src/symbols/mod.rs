//! Lexical symbol extraction and file classification.
//!
//! Symbols are found with line-anchored regular expressions rather than a
//! parser. Declarations that appear inside string literals or comments are
//! matched too; the results feed cosmetic text only.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Matches `def name(` at the start of a line, optionally indented and
/// optionally preceded by `async`.
static FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:async\s+)?def\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*\(")
        .expect("function pattern is valid")
});

/// Matches `class Name(` or `class Name:` at the start of a line.
static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*class\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*[\(:]")
        .expect("class pattern is valid")
});

/// Function-like and type-like names declared in a piece of source text.
///
/// Both lists keep the order in which the names first appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolSet {
    /// Function and method names.
    pub functions: Vec<String>,
    /// Class and type names.
    pub classes: Vec<String>,
}

impl SymbolSet {
    /// Returns true when neither functions nor classes were found.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.classes.is_empty()
    }

    /// Returns up to `limit` names, classes first, then functions.
    pub fn leading(&self, limit: usize) -> Vec<&str> {
        self.classes
            .iter()
            .chain(self.functions.iter())
            .take(limit)
            .map(String::as_str)
            .collect()
    }
}

/// Extracts declared function and class names from raw text.
///
/// Never fails; text with no declarations yields an empty [`SymbolSet`].
pub fn extract_symbols(content: &str) -> SymbolSet {
    SymbolSet {
        functions: capture_names(&FUNCTION_RE, content),
        classes: capture_names(&CLASS_RE, content),
    }
}

fn capture_names(re: &Regex, content: &str) -> Vec<String> {
    re.captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Returns the lowercased extension of `filename` including the dot, or an
/// empty string when there is none.
pub(crate) fn extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Maps a filename to a human-readable file kind based on its extension.
///
/// Unknown extensions map to `"source file"`.
pub fn classify_file(filename: &str) -> &'static str {
    match extension(filename).as_str() {
        ".py" => "Python module",
        ".js" => "JavaScript module",
        ".ts" => "TypeScript module",
        ".tsx" => "React TypeScript component",
        ".jsx" => "React JavaScript component",
        ".java" => "Java class",
        ".rb" => "Ruby script",
        ".go" => "Go source file",
        ".rs" => "Rust source file",
        ".c" => "C source file",
        ".cpp" => "C++ source file",
        ".cs" => "C# source file",
        ".sh" => "Shell script",
        ".sql" => "SQL script",
        ".yaml" | ".yml" => "YAML configuration",
        ".json" => "JSON configuration",
        ".md" => "Markdown document",
        ".html" => "HTML template",
        ".css" => "CSS stylesheet",
        _ => "source file",
    }
}

/// Returns the first line that is non-empty after trimming and does not
/// start with any of `comment_markers`. The returned slice is trimmed.
pub fn first_meaningful_line<'a>(content: &'a str, comment_markers: &[&str]) -> Option<&'a str> {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !comment_markers.iter().any(|m| line.starts_with(m)))
}

/// Returns at most the first `max_chars` characters of `s`.
pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
