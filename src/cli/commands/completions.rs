//! Completions command - generate shell completion scripts.

use clap::Command;
use clap_complete::{generate, Shell};
use std::io;

/// Arguments for the completions command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    code-obituary completions bash > ~/.local/share/bash-completion/completions/code-obituary\n    \
    code-obituary completions zsh > ~/.zfunc/_code-obituary\n    \
    code-obituary completions fish > ~/.config/fish/completions/code-obituary.fish")]
pub struct Args {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Writes completions for `cmd` to stdout.
///
/// Called from main.rs, which owns the top-level `Cli` definition.
pub fn generate_completions(cmd: &mut Command, shell: Shell) {
    generate(shell, cmd, "code-obituary", &mut io::stdout());
}
