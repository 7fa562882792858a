//! code-obituary - obituaries for deleted code
//!
//! Every deleted file gets a short obituary in `GRAVEYARD.md`: what it was,
//! how long it lived and why it died. Symbols are extracted lexically,
//! dates come from git history, and the prose is written by an optional
//! LLM provider with a deterministic template as fallback.

pub mod cli;
pub mod config;
pub mod git;
pub mod graveyard;
pub mod obituary;
pub mod symbols;
