//! Command-line interface for code-obituary.
//!
//! Thin commands over the library: mourning a file, installing the
//! pre-commit hook, and reading the graveyard back.

/// Individual CLI command implementations.
pub mod commands;

/// Output format selection shared by commands.
pub mod format;

pub use format::OutputFormat;
