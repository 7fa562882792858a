use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use code_obituary::cli::commands;

/// The main CLI command line interface.
#[derive(Parser)]
#[command(name = "code-obituary")]
#[command(version)]
#[command(about = "Write obituaries for deleted code")]
#[command(long_about = "code-obituary writes an obituary for every file you delete and\n\
    appends it to GRAVEYARD.md at the root of your repository.\n\n\
    Obituaries are written by an LLM provider when one is configured,\n\
    and by a built-in template otherwise.")]
#[command(after_help = "EXAMPLES:\n    \
    code-obituary install                  Install the pre-commit hook\n    \
    code-obituary mourn src/old.py         Mourn a file by hand\n    \
    code-obituary list                     List all obituaries\n    \
    code-obituary view                     Print GRAVEYARD.md\n\n\
    For more information about a command, run 'code-obituary <command> --help'.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Write an obituary for a deleted or soon-to-be-deleted file
    #[command(long_about = "Composes an obituary for FILEPATH from its content and git\n\
        history and appends it to GRAVEYARD.md. With --from-git the\n\
        content is read from HEAD, which is how the pre-commit hook\n\
        mourns files that are already gone from the working tree.\n\n\
        With --staged every file staged for deletion is mourned in turn.")]
    Mourn(commands::mourn::Args),

    /// Install the pre-commit hook in the current git repository
    #[command(long_about = "Installs a pre-commit hook that mourns every file staged for\n\
        deletion and stages the updated GRAVEYARD.md. An existing\n\
        pre-commit hook is kept and our script is appended to it.")]
    Install(commands::install::Args),

    /// Display the contents of GRAVEYARD.md
    View(commands::view::Args),

    /// List all obituaries with their dates
    List(commands::list::Args),

    /// View and manage configuration settings
    #[command(long_about = "Provides subcommands to show, get, and set configuration values.\n\
        Configuration is stored in ~/.code-obituary/config.yaml.")]
    Config(commands::config::Args),

    /// Generate shell completion scripts
    Completions(commands::completions::Args),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "code_obituary=debug"
    } else {
        "code_obituary=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Mourn(args) => commands::mourn::run(args),
        Commands::Install(args) => commands::install::run(args),
        Commands::View(args) => commands::view::run(args),
        Commands::List(args) => commands::list::run(args),
        Commands::Config(args) => commands::config::run(args),
        Commands::Completions(args) => {
            commands::completions::generate_completions(&mut Cli::command(), args.shell);
            Ok(())
        }
    }
}
