//! Configuration loading, validation, and management for Shieldline.
//!
//! Loads configuration from `~/.shieldline/config.toml` with environment
//! variable overrides. Validates all settings at load time.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.shieldline/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Guard service settings
    #[serde(default)]
    pub guard: GuardConfig,

    /// Completion service settings
    #[serde(default)]
    pub anthropic: AnthropicConfig,
}

fn default_domain() -> String {
    "aws.us.pangea.cloud".into()
}
fn default_input_recipe() -> String {
    "pangea_prompt_guard".into()
}
fn default_output_recipe() -> String {
    "pangea_llm_response_guard".into()
}
fn default_guard_timeout() -> u64 {
    30
}
fn default_anthropic_url() -> String {
    "https://api.anthropic.com".into()
}
fn default_anthropic_timeout() -> u64 {
    300
}
fn default_model() -> String {
    "claude-sonnet-4-20250514".into()
}
fn default_max_tokens() -> u32 {
    1024
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// AI Guard service token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Service domain; the endpoint is `https://ai-guard.{domain}`
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Full endpoint override (proxies, tests)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Recipe applied to prompts
    #[serde(default = "default_input_recipe")]
    pub input_recipe: String,

    /// Recipe applied to model responses
    #[serde(default = "default_output_recipe")]
    pub output_recipe: String,

    #[serde(default = "default_guard_timeout")]
    pub timeout_secs: u64,
}

impl GuardConfig {
    /// The endpoint base URL, honoring `base_url` over `domain`.
    pub fn endpoint(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://ai-guard.{}", self.domain),
        }
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            token: None,
            domain: default_domain(),
            base_url: None,
            input_recipe: default_input_recipe(),
            output_recipe: default_output_recipe(),
            timeout_secs: default_guard_timeout(),
        }
    }
}

impl std::fmt::Debug for GuardConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardConfig")
            .field("token", &redact(&self.token))
            .field("domain", &self.domain)
            .field("base_url", &self.base_url)
            .field("input_recipe", &self.input_recipe)
            .field("output_recipe", &self.output_recipe)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_anthropic_url")]
    pub base_url: String,

    #[serde(default = "default_anthropic_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_anthropic_url(),
            timeout_secs: default_anthropic_timeout(),
            default_model: default_model(),
            default_max_tokens: default_max_tokens(),
        }
    }
}

impl std::fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("default_model", &self.default_model)
            .field("default_max_tokens", &self.default_max_tokens)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.shieldline/config.toml).
    ///
    /// Environment variables:
    /// - `PANGEA_AI_GUARD_TOKEN` (used when no token is in the file)
    /// - `PANGEA_DOMAIN`
    /// - `ANTHROPIC_API_KEY` (used when no key is in the file)
    /// - `ANTHROPIC_BASE_URL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.guard.token.is_none() {
            self.guard.token = lookup("PANGEA_AI_GUARD_TOKEN");
        }
        if let Some(domain) = lookup("PANGEA_DOMAIN") {
            self.guard.domain = domain;
        }
        if self.anthropic.api_key.is_none() {
            self.anthropic.api_key = lookup("ANTHROPIC_API_KEY");
        }
        if let Some(url) = lookup("ANTHROPIC_BASE_URL") {
            self.anthropic.base_url = url;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".shieldline")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.guard.input_recipe.trim().is_empty() || self.guard.output_recipe.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "guard recipes must not be empty".into(),
            ));
        }

        if self.guard.timeout_secs == 0 || self.anthropic.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be > 0".into(),
            ));
        }

        if self.anthropic.default_max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "default_max_tokens must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for shieldline_core::Error {
    fn from(err: ConfigError) -> Self {
        shieldline_core::Error::Config(Box::new(err))
    }
}
