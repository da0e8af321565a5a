//! Configuration management for chat_conduit
//!
//! Supports configuration via:
//! 1. Config file (~/.config/chat-conduit/config.toml)
//! 2. Environment variables (OPENAI_API_KEY, OPENROUTER_API_KEY, etc.)
//! 3. CLI arguments (override file/env settings)

use crate::api::{ProviderConfig, ProviderKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Provider used when a command does not name one
    pub current_provider: ProviderKind,

    /// OpenAI settings
    pub openai: ProviderSettings,

    /// OpenRouter settings
    pub openrouter: ProviderSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            current_provider: ProviderKind::OpenAi,
            openai: ProviderSettings::default(),
            openrouter: ProviderSettings::default(),
        }
    }
}

/// Per-provider settings; unset fields fall back to registry defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// API key (can also use the provider's *_API_KEY env var)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Model override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_model: Option<String>,

    /// HTTP(S) proxy URL, empty/unset for a direct connection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
}

impl Config {
    /// Get default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chat-conduit")
            .join("config.toml")
    }

    /// Load config from default location
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::default_path())
    }

    /// Load config from specific path
    pub fn load_from(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default().with_env_overrides());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;

        Ok(config.with_env_overrides())
    }

    /// Load the config file without env overrides, for editing and saving.
    /// Keeps environment-provided keys out of the persisted file.
    pub fn load_file() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.openai.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            self.openai.api_url = Some(url);
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            self.openai.api_model = Some(model);
        }

        if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
            self.openrouter.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("OPENROUTER_BASE_URL") {
            self.openrouter.api_url = Some(url);
        }
        if let Ok(model) = std::env::var("OPENROUTER_MODEL") {
            self.openrouter.api_model = Some(model);
        }

        self
    }

    /// Save config to default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::default_path())
    }

    /// Save config to specific path
    pub fn save_to(&self, path: PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    pub fn settings(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::OpenRouter => &self.openrouter,
        }
    }

    pub fn settings_mut(&mut self, kind: ProviderKind) -> &mut ProviderSettings {
        match kind {
            ProviderKind::OpenAi => &mut self.openai,
            ProviderKind::OpenRouter => &mut self.openrouter,
        }
    }

    /// Resolve stored settings into the record handed to a provider
    pub fn provider_config(&self, kind: ProviderKind) -> ProviderConfig {
        let settings = self.settings(kind);
        ProviderConfig {
            api_key: settings.api_key.clone().unwrap_or_default(),
            api_base: settings.api_url.clone(),
            model: settings.api_model.clone(),
            proxy: settings.proxy.clone(),
        }
    }

    /// Set a value by dotted key (`current_provider`, `openai.api_key`, ...).
    /// An empty value clears the field.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        if key == "current_provider" {
            self.current_provider = ProviderKind::from_name(value)
                .map_err(|_| ConfigError::UnknownProvider(value.to_string()))?;
            return Ok(());
        }

        let (provider, field) = key
            .split_once('.')
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        let kind = ProviderKind::from_name(provider)
            .map_err(|_| ConfigError::UnknownProvider(provider.to_string()))?;

        let settings = self.settings_mut(kind);
        let slot = match field {
            "api_key" => &mut settings.api_key,
            "api_url" => &mut settings.api_url,
            "api_model" => &mut settings.api_model,
            "proxy" => &mut settings.proxy,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };

        *slot = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };

        Ok(())
    }

    /// Generate example config content
    pub fn example() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}

/// Mask an API key for display, keeping a short recognizable tail
pub fn redact_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        "****".to_string()
    } else {
        format!(
            "{}...{}",
            chars[..4].iter().collect::<String>(),
            chars[chars.len() - 4..].iter().collect::<String>()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.current_provider, ProviderKind::OpenAi);
        assert!(config.openai.api_key.is_none());
        assert!(config.openrouter.api_model.is_none());
    }

    #[test]
    fn test_set_dotted_keys() {
        let mut config = Config::default();
        config.set("openai.api_key", "sk-test").unwrap();
        config.set("openrouter.api_model", "openrouter/auto").unwrap();
        config.set("current_provider", "openrouter").unwrap();

        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(
            config.openrouter.api_model.as_deref(),
            Some("openrouter/auto")
        );
        assert_eq!(config.current_provider, ProviderKind::OpenRouter);
    }

    #[test]
    fn test_set_empty_value_clears_field() {
        let mut config = Config::default();
        config.set("openai.proxy", "http://127.0.0.1:7890").unwrap();
        config.set("openai.proxy", "").unwrap();
        assert!(config.openai.proxy.is_none());
    }

    #[test]
    fn test_set_rejects_unknown_keys() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("openai.nope", "x"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            config.set("dalle.api_key", "x"),
            Err(ConfigError::UnknownProvider(_))
        ));
        assert!(matches!(
            config.set("api_key", "x"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_provider_config_resolution() {
        let mut config = Config::default();
        config.set("openrouter.api_key", "sk-or").unwrap();
        config.set("openrouter.proxy", "http://127.0.0.1:7890").unwrap();

        let resolved = config.provider_config(ProviderKind::OpenRouter);
        assert_eq!(resolved.api_key, "sk-or");
        assert_eq!(resolved.proxy.as_deref(), Some("http://127.0.0.1:7890"));
        assert!(resolved.api_base.is_none());
        assert!(resolved.model.is_none());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.set("openai.api_model", "gpt-4o-mini").unwrap();
        config.set("current_provider", "openrouter").unwrap();

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.openai.api_model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(parsed.current_provider, ProviderKind::OpenRouter);
    }

    #[test]
    fn test_env_overrides_apply() {
        std::env::set_var("OPENROUTER_MODEL", "env-model");
        let config = Config::default().with_env_overrides();
        assert_eq!(config.openrouter.api_model.as_deref(), Some("env-model"));
        std::env::remove_var("OPENROUTER_MODEL");
    }

    #[test]
    fn test_example_config() {
        let example = Config::example();
        assert!(example.contains("[openai]"));
        assert!(example.contains("[openrouter]"));
        assert!(example.contains("current_provider"));
    }

    #[test]
    fn test_redact_key() {
        assert_eq!(redact_key("short"), "****");
        assert_eq!(redact_key("sk-abcdefghijklmnop"), "sk-a...mnop");
    }
}
