//! Prompt construction for LLM-written obituaries.

use crate::symbols::{extract_symbols, truncate_chars};

/// Maximum characters of file content sent to the provider.
pub const MAX_PREVIEW_CHARS: usize = 2000;

/// Returns the system prompt that sets the tone of the obituary.
pub fn system_prompt() -> &'static str {
    "You are writing a poetic, brief obituary for a deleted piece of code. \
     Write 3-5 sentences in a respectful, slightly melancholy tone like an \
     obituary in a newspaper.\n\n\
     Rules:\n\
     - Mention what the code did, how long it lived, and what caused its deletion.\n\
     - Be creative but concise.\n\
     - Do not use markdown headers. Plain prose only."
}

/// Everything the provider is told about the deceased file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObituaryRequest {
    pub filename: String,
    pub line_count: usize,
    /// Lifetime sentence; empty when no dates are known.
    pub lifetime: String,
    pub cause: String,
    /// Symbol summary; empty when no symbols were found.
    pub symbols: String,
    /// The first [`MAX_PREVIEW_CHARS`] characters of the file.
    pub content_preview: String,
}

impl ObituaryRequest {
    pub fn new(
        filename: &str,
        content: &str,
        reason: Option<&str>,
        born: Option<&str>,
        died: Option<&str>,
    ) -> Self {
        let lifetime = match (born, died) {
            (Some(born), Some(died)) => format!("It was created on {born} and deleted on {died}."),
            (None, Some(died)) => format!("It was deleted on {died}."),
            _ => String::new(),
        };

        let cause = match reason {
            Some(reason) if !reason.trim().is_empty() => format!("Cause of death: {reason}"),
            _ => "Cause of death: unknown (likely refactoring or replacement).".to_string(),
        };

        let found = extract_symbols(content);
        let mut parts = Vec::new();
        if !found.classes.is_empty() {
            parts.push(format!("Classes: {}", found.classes.join(", ")));
        }
        if !found.functions.is_empty() {
            parts.push(format!("Functions: {}", found.functions.join(", ")));
        }
        let symbols = if parts.is_empty() {
            String::new()
        } else {
            format!("{}.", parts.join(". "))
        };

        Self {
            filename: filename.to_string(),
            line_count: content.lines().count(),
            lifetime,
            cause,
            symbols,
            content_preview: truncate_chars(content, MAX_PREVIEW_CHARS).to_string(),
        }
    }

    /// Renders the user message sent alongside [`system_prompt`].
    pub fn render(&self) -> String {
        format!(
            "File: {}\n\
             Lines of code: {}\n\
             {}\n\
             {}\n\
             {}\n\n\
             Code content (preview):\n\
             ```\n\
             {}\n\
             ```\n\n\
             Write the obituary now:",
            self.filename,
            self.line_count,
            self.lifetime,
            self.cause,
            self.symbols,
            self.content_preview
        )
    }
}
