//! Configuration management
//!
//! Settings live in `~/.code-obituary/config.yaml`. A missing file means
//! defaults, which leave the obituary provider unconfigured.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Keys accepted by [`Config::get`] and [`Config::set`].
pub const CONFIG_KEYS: &[&str] = &[
    "obituary_provider",
    "obituary_model",
    "anthropic_api_key",
    "openai_api_key",
    "openrouter_api_key",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider used for obituaries: anthropic, openai or openrouter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obituary_provider: Option<String>,

    /// Model override for the selected provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obituary_model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openrouter_api_key: Option<String>,
}

/// Errors raised while reading or writing the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not find home directory")]
    NoHomeDir,

    #[error("Unknown config key '{0}'. Expected one of: {keys}", keys = CONFIG_KEYS.join(", "))]
    UnknownKey(String),

    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config YAML: {0}")]
    Yaml(String),
}

impl Config {
    /// Loads the configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads the configuration from `path`, returning defaults when the
    /// file does not exist or is empty.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_saphyr::from_str(&contents).map_err(|e| ConfigError::Yaml(e.to_string()))
    }

    /// Saves the configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Saves the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let yaml = serde_saphyr::to_string(self).map_err(|e| ConfigError::Yaml(e.to_string()))?;
        fs::write(path, yaml).map_err(io_err)
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::home_dir()
            .ok_or(ConfigError::NoHomeDir)?
            .join(".code-obituary");

        Ok(config_dir.join("config.yaml"))
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Result<Option<&str>, ConfigError> {
        let value = match key {
            "obituary_provider" => &self.obituary_provider,
            "obituary_model" => &self.obituary_model,
            "anthropic_api_key" => &self.anthropic_api_key,
            "openai_api_key" => &self.openai_api_key,
            "openrouter_api_key" => &self.openrouter_api_key,
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value.as_deref())
    }

    /// Stores `value` under `key`. An empty value clears the key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let slot = match key {
            "obituary_provider" => &mut self.obituary_provider,
            "obituary_model" => &mut self.obituary_model,
            "anthropic_api_key" => &mut self.anthropic_api_key,
            "openai_api_key" => &mut self.openai_api_key,
            "openrouter_api_key" => &mut self.openrouter_api_key,
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        *slot = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
        Ok(())
    }

    /// Returns the API key configured for `provider`, if any.
    pub fn api_key_for_provider(&self, provider: &str) -> Option<String> {
        match provider.to_lowercase().as_str() {
            "anthropic" => self.anthropic_api_key.clone(),
            "openai" => self.openai_api_key.clone(),
            "openrouter" => self.openrouter_api_key.clone(),
            _ => None,
        }
    }
}

/// Masks all but the last four characters of a secret for display.
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{tail}", "*".repeat(count - 4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_empty_file_returns_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "\n").unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_load_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "obituary_provider: anthropic\nanthropic_api_key: sk-test\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.obituary_provider.as_deref(), Some("anthropic"));
        assert_eq!(config.api_key_for_provider("anthropic").as_deref(), Some("sk-test"));
        assert_eq!(config.api_key_for_provider("openai"), None);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.set("obituary_provider", "openai").unwrap();
        config.set("openai_api_key", "sk-abc").unwrap();
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_get_set_unknown_key() {
        let mut config = Config::default();
        assert!(matches!(config.get("nope"), Err(ConfigError::UnknownKey(_))));
        let err = config.set("nope", "x").unwrap_err();
        assert!(err.to_string().contains("openrouter_api_key"));
    }

    #[test]
    fn test_set_empty_clears() {
        let mut config = Config::default();
        config.set("obituary_model", "m").unwrap();
        assert_eq!(config.get("obituary_model").unwrap(), Some("m"));
        config.set("obituary_model", "").unwrap();
        assert_eq!(config.get("obituary_model").unwrap(), None);
    }

    #[test]
    fn test_log_location_is_not_configurable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "graveyard_file: docs/RIP.md\nobituary_model: m\n").unwrap();

        // Stale keys in an old file are ignored rather than rejected.
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.obituary_model.as_deref(), Some("m"));

        let mut config = Config::default();
        assert!(matches!(
            config.set("graveyard_file", "docs/RIP.md"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(!CONFIG_KEYS.contains(&"graveyard_file"));
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("sk-1234567"), "******4567");
        assert_eq!(mask_secret("abc"), "***");
    }
}
