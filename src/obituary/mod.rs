//! Obituary composition.
//!
//! Turns a deleted file's name, content and lifecycle dates into prose.
//! A configured LLM provider writes the obituary when available; every
//! failure on that path falls back to a deterministic template built from
//! the file's extension and extracted symbols.
//!
//! # Usage
//!
//! [`generate_obituary`] resolves the provider from `~/.code-obituary/config.yaml`
//! and environment variables. [`generate_obituary_with`] takes the provider
//! directly, which keeps the fallback path testable without a network.

pub mod prompt;
pub mod provider;

use std::env;

use crate::config::Config;
use crate::symbols::{classify_file, extension, extract_symbols, first_meaningful_line, truncate_chars};

pub use prompt::ObituaryRequest;
pub use provider::{create_provider, ObituaryProvider, ObituaryResponse, ProviderKind};

/// Classes and functions named in a file description.
const DESCRIPTION_SYMBOL_LIMIT: usize = 5;

/// Symbols named as survivors in a fallback obituary.
const SURVIVOR_LIMIT: usize = 3;

/// Characters of the first code line quoted as last words.
const LAST_WORDS_CHARS: usize = 60;

/// Resolved provider settings.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: String,
    /// Model override (uses the provider default if None).
    pub model: Option<String>,
}

/// Resolves provider settings from the config file and environment.
///
/// Environment variables take precedence over config file values:
/// - `OBITUARY_PROVIDER` overrides `obituary_provider`
/// - `OBITUARY_API_KEY` overrides the provider-specific API key
/// - `OBITUARY_MODEL` overrides `obituary_model`
///
/// With nothing else configured, `ANTHROPIC_API_KEY` alone selects the
/// Anthropic provider.
pub fn resolve_provider_config() -> Result<ProviderConfig, ObituaryError> {
    let config = Config::load().map_err(|e| {
        tracing::warn!("Ignoring unreadable config: {e}");
        ObituaryError::NotConfigured
    })?;
    resolve_provider_config_from(&config, |key| env::var(key).ok())
}

/// Resolution logic behind [`resolve_provider_config`] with the
/// environment lookup injected.
pub fn resolve_provider_config_from(
    config: &Config,
    env_var: impl Fn(&str) -> Option<String>,
) -> Result<ProviderConfig, ObituaryError> {
    let provider_str = env_var("OBITUARY_PROVIDER")
        .or_else(|| config.obituary_provider.clone())
        .or_else(|| {
            env_var("ANTHROPIC_API_KEY")
                .filter(|k| !k.is_empty())
                .map(|_| ProviderKind::Anthropic.to_string())
        })
        .ok_or(ObituaryError::NotConfigured)?;

    let kind: ProviderKind = provider_str.parse().map_err(|e: String| {
        tracing::warn!("{e}");
        ObituaryError::NotConfigured
    })?;

    // API key: env var > config file > the provider's own env var
    let api_key = env_var("OBITUARY_API_KEY")
        .or_else(|| config.api_key_for_provider(&provider_str))
        .or_else(|| env_var(native_key_var(kind)))
        .filter(|k| !k.is_empty())
        .ok_or(ObituaryError::NotConfigured)?;

    let model = env_var("OBITUARY_MODEL").or_else(|| config.obituary_model.clone());

    Ok(ProviderConfig {
        kind,
        api_key,
        model,
    })
}

/// The environment variable each provider's own SDKs read.
fn native_key_var(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        ProviderKind::OpenAI => "OPENAI_API_KEY",
        ProviderKind::OpenRouter => "OPENROUTER_API_KEY",
    }
}

/// Builds a one-sentence description of a file from its kind, size and symbols.
pub fn compose_description(filename: &str, content: &str) -> String {
    let symbols = extract_symbols(content);
    let line_count = content.lines().count();

    let mut parts = vec![format!(
        "{filename} was a {} with {line_count} lines",
        classify_file(filename)
    )];
    if !symbols.classes.is_empty() {
        parts.push(format!(
            "containing the classes: {}",
            leading_names(&symbols.classes, DESCRIPTION_SYMBOL_LIMIT)
        ));
    }
    if !symbols.functions.is_empty() {
        parts.push(format!(
            "defining the functions: {}",
            leading_names(&symbols.functions, DESCRIPTION_SYMBOL_LIMIT)
        ));
    }

    format!("{}.", parts.join(". "))
}

fn leading_names(names: &[String], limit: usize) -> String {
    names
        .iter()
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Flavor text describing what a file of this kind did in life.
fn role_for(filename: &str) -> &'static str {
    match extension(filename).as_str() {
        ".py" => "faithfully served the Python runtime",
        ".js" => "brought interactivity to the browser",
        ".ts" => "ensured type safety across the codebase",
        ".java" => "upheld the Java virtual machine's grand tradition",
        ".rb" => "embraced the principle of programmer happiness",
        ".go" => "kept concurrency simple and efficient",
        ".rs" => "compiled without fear of memory errors",
        ".sh" => "automated the mundane so humans didn't have to",
        ".sql" => "guarded the sanctity of relational data",
        ".css" => "kept the UI beautiful and consistent",
        ".html" => "structured content for the world to see",
        _ => "contributed to the project",
    }
}

/// Writes an obituary from a fixed template.
///
/// Deterministic and infallible; the result always contains `filename`.
pub fn compose_fallback_obituary(
    filename: &str,
    content: &str,
    born: Option<&str>,
    died: Option<&str>,
    reason: Option<&str>,
) -> String {
    let symbols = extract_symbols(content);
    let line_count = content.lines().count();

    let lifetime = match (born, died) {
        (Some(born), Some(died)) => format!(" from {born} to {died}"),
        (None, Some(died)) => format!(" until {died}"),
        _ => String::new(),
    };

    let cause = match reason {
        Some(reason) if !reason.trim().is_empty() => format!(" due to: {reason}"),
        _ => " in the natural course of refactoring".to_string(),
    };

    let survivors = symbols.leading(SURVIVOR_LIMIT);
    let survivor_line = if survivors.is_empty() {
        String::new()
    } else {
        format!(
            " It is survived by the memories of `{}`.",
            survivors.join("`, `")
        )
    };

    let last_words = first_meaningful_line(content, &["#"])
        .map(|line| {
            format!(
                "\n\n*Last words: \"{}...\"*",
                truncate_chars(line, LAST_WORDS_CHARS)
            )
        })
        .unwrap_or_default();

    format!(
        "{filename} {}{lifetime}, spanning {line_count} lines of code. \
         It was deleted{cause}.{survivor_line}{last_words}",
        role_for(filename)
    )
}

/// Generates an obituary, using the configured provider when there is one.
///
/// Always returns usable prose: provider problems of any kind fall back to
/// [`compose_fallback_obituary`].
pub fn generate_obituary(
    filename: &str,
    content: &str,
    reason: Option<&str>,
    born: Option<&str>,
    died: Option<&str>,
) -> String {
    let provider = match resolve_provider_config() {
        Ok(config) => {
            tracing::debug!("Using {} provider for obituary", config.kind);
            match create_provider(config.kind, config.api_key, config.model) {
                Ok(provider) => Some(provider),
                Err(e) => {
                    tracing::warn!("Could not create obituary provider: {e}");
                    return with_unavailable_note(
                        compose_fallback_obituary(filename, content, born, died, reason),
                        &e,
                    );
                }
            }
        }
        Err(_) => None,
    };

    generate_obituary_with(provider.as_deref(), filename, content, reason, born, died)
}

/// Generates an obituary with an explicit provider.
///
/// `None` means no provider is configured and yields the plain fallback.
/// A provider failure yields the fallback plus a note that the enriched
/// obituary was unavailable.
pub fn generate_obituary_with(
    provider: Option<&dyn ObituaryProvider>,
    filename: &str,
    content: &str,
    reason: Option<&str>,
    born: Option<&str>,
    died: Option<&str>,
) -> String {
    let Some(provider) = provider else {
        return compose_fallback_obituary(filename, content, born, died, reason);
    };

    let request = ObituaryRequest::new(filename, content, reason, born, died);
    let result = provider
        .write(prompt::system_prompt(), &request.render())
        .and_then(|response| {
            let text = normalize_whitespace(&response.content);
            if text.is_empty() {
                Err(ObituaryError::EmptyResponse)
            } else {
                Ok(text)
            }
        });

    match result {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Obituary provider failed for {filename}: {e}");
            with_unavailable_note(
                compose_fallback_obituary(filename, content, born, died, reason),
                &e,
            )
        }
    }
}

fn with_unavailable_note(fallback: String, error: &ObituaryError) -> String {
    format!("{fallback}\n\n*(AI obituary unavailable: {error})*")
}

/// Trims the text and collapses runs of 3+ newlines down to 2.
fn normalize_whitespace(text: &str) -> String {
    let trimmed = text.trim();
    let mut result = String::with_capacity(trimmed.len());
    let mut consecutive_newlines = 0u32;

    for ch in trimmed.chars() {
        if ch == '\n' {
            consecutive_newlines += 1;
            if consecutive_newlines <= 2 {
                result.push(ch);
            }
        } else {
            consecutive_newlines = 0;
            result.push(ch);
        }
    }

    result
}

/// Errors that can occur while asking a provider for an obituary.
///
/// These never escape [`generate_obituary`]; they end up in logs and in
/// the "unavailable" note appended to the fallback text.
#[derive(Debug, thiserror::Error)]
pub enum ObituaryError {
    #[error(
        "Obituary provider not configured. Set OBITUARY_PROVIDER and the corresponding API key."
    )]
    NotConfigured,

    /// Network, timeout or client construction error.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("HTTP error ({status}): {body}")]
    HttpError { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Provider returned an empty obituary")]
    EmptyResponse,
}
