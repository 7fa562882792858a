//! Config command - manage configuration

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use crate::config::{mask_secret, Config, CONFIG_KEYS};

#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    code-obituary config                                   Show configuration\n    \
    code-obituary config set obituary_provider anthropic   Choose a provider\n    \
    code-obituary config set anthropic_api_key sk-...      Store an API key\n    \
    code-obituary config set obituary_model \"\"             Clear a value")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value (an empty value clears it)
    Set { key: String, value: String },
}

pub fn run(args: Args) -> Result<()> {
    match args.command {
        Some(ConfigCommand::Show) | None => show_config(),
        Some(ConfigCommand::Get { key }) => get_config(&key),
        Some(ConfigCommand::Set { key, value }) => set_config(&key, &value),
    }
}

fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("{}", "code-obituary Configuration".bold());
    println!();
    println!(
        "  {}  {}",
        "Config file:".dimmed(),
        Config::config_path()?.display()
    );
    println!();

    for key in CONFIG_KEYS {
        let value = match config.get(key)? {
            Some(v) => display_value(key, v),
            None => "(not set)".dimmed().to_string(),
        };
        println!("  {:<20} {}", format!("{key}:"), value);
    }

    Ok(())
}

fn get_config(key: &str) -> Result<()> {
    let config = Config::load()?;
    match config.get(key)? {
        Some(value) => println!("{value}"),
        None => println!("{}", format!("Config key '{key}' is not set").yellow()),
    }
    Ok(())
}

fn set_config(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    if value.is_empty() {
        println!("{} {}", "Cleared".green(), key);
    } else {
        println!("{} {} = {}", "Set".green(), key, display_value(key, value));
    }
    Ok(())
}

/// API keys are masked; everything else is shown as stored.
fn display_value(key: &str, value: &str) -> String {
    if key.ends_with("_api_key") {
        mask_secret(value)
    } else {
        value.to_string()
    }
}
