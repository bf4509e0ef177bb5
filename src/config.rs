//! Configuration management for Chatdrop
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{ChatdropError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default per-batch file ceiling
pub const DEFAULT_MAX_FILES_PER_BATCH: usize = 10;

/// Default per-file size ceiling (200 MiB)
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 200 * 1024 * 1024;

/// Main configuration structure for Chatdrop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Provider configuration
    pub provider: ProviderConfig,
    /// Upload gate limits
    #[serde(default)]
    pub upload: UploadConfig,
    /// Prompt assembly and chat behavior
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Provider configuration
///
/// Specifies which AI provider to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type")]
    pub provider_type: String,

    /// OpenAI (or OpenAI-compatible) configuration
    #[serde(default)]
    pub openai: OpenAiConfig,
}

/// OpenAI provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API base URL, without trailing slash
    #[serde(default = "default_openai_api_base")]
    pub api_base: String,

    /// Chat completion model
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Image generation model
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Size requested from the image generation endpoint
    #[serde(default = "default_image_size")]
    pub image_size: String,

    /// Quality requested from the image generation endpoint
    #[serde(default = "default_image_quality")]
    pub image_quality: String,

    /// API key; prefer the environment or keyring over storing it here
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Optional request timeout. Requests wait indefinitely when unset.
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

fn default_openai_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_image_size() -> String {
    "1024x1024".to_string()
}

fn default_image_quality() -> String {
    "standard".to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: default_openai_api_base(),
            model: default_openai_model(),
            image_model: default_image_model(),
            image_size: default_image_size(),
            image_quality: default_image_quality(),
            api_key: None,
            request_timeout_seconds: None,
        }
    }
}

/// Upload gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum number of files accepted in one batch
    #[serde(default = "default_max_files")]
    pub max_files_per_batch: usize,

    /// Maximum size of a single file (bytes)
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,

    /// Skip files whose (name, size) pair was already accepted this session
    #[serde(default = "default_deduplicate")]
    pub deduplicate: bool,
}

fn default_max_files() -> usize {
    DEFAULT_MAX_FILES_PER_BATCH
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE_BYTES
}

fn default_deduplicate() -> bool {
    true
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_files_per_batch: default_max_files(),
            max_file_size_bytes: default_max_file_size(),
            deduplicate: default_deduplicate(),
        }
    }
}

/// How uploaded images reach the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImagePolicy {
    /// A fixed sentence replaces the image
    #[default]
    Placeholder,
    /// The image is sent as a base64 data URI to a vision-capable model
    Inline,
    /// The image is shown on the chat surface; the model gets a placeholder
    DisplayOnly,
}

impl ImagePolicy {
    /// Parse a policy name as written in config or environment
    pub fn parse_str(s: &str) -> std::result::Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "placeholder" => Ok(Self::Placeholder),
            "inline" => Ok(Self::Inline),
            "display_only" | "display-only" => Ok(Self::DisplayOnly),
            other => Err(format!(
                "Invalid image policy: {}. Must be one of: placeholder, inline, display_only",
                other
            )),
        }
    }
}

/// Shape of the outgoing message list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryMode {
    /// Native multi-turn message list
    #[default]
    Structured,
    /// Prior turns flattened into a transcript inside one user message
    Flattened,
}

impl HistoryMode {
    /// Parse a history mode name as written in config or environment
    pub fn parse_str(s: &str) -> std::result::Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "structured" => Ok(Self::Structured),
            "flattened" => Ok(Self::Flattened),
            other => Err(format!(
                "Invalid history mode: {}. Must be one of: structured, flattened",
                other
            )),
        }
    }
}

/// Whether inlined attachment text is resent with later requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentRetention {
    /// Only the turn that consumed the attachment carries its content
    #[default]
    OneShot,
    /// Attachment content stays in the model-facing history
    Persistent,
}

/// Chat behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Image handling policy
    #[serde(default)]
    pub image_policy: ImagePolicy,

    /// Outgoing history shape
    #[serde(default)]
    pub history_mode: HistoryMode,

    /// Attachment retention in history
    #[serde(default)]
    pub attachment_retention: AttachmentRetention,

    /// Allow an empty message to be sent when files are pending
    #[serde(default = "default_allow_empty_submission")]
    pub allow_empty_submission: bool,
}

fn default_allow_empty_submission() -> bool {
    true
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            image_policy: ImagePolicy::default(),
            history_mode: HistoryMode::default(),
            attachment_retention: AttachmentRetention::default(),
            allow_empty_submission: default_allow_empty_submission(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    /// Platform config location, e.g. `~/.config/chatdrop/config.yaml`
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("com", "chatdrop", "chatdrop")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
            .unwrap_or_else(|| PathBuf::from("config/config.yaml"))
    }

    fn default_config() -> Self {
        Self {
            provider: ProviderConfig {
                provider_type: "openai".to_string(),
                openai: OpenAiConfig::default(),
            },
            upload: UploadConfig::default(),
            chat: ChatConfig::default(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ChatdropError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ChatdropError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider_type) = std::env::var("CHATDROP_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(api_base) = std::env::var("CHATDROP_OPENAI_API_BASE") {
            self.provider.openai.api_base = api_base.trim_end_matches('/').to_string();
        }

        if let Ok(model) = std::env::var("CHATDROP_OPENAI_MODEL") {
            self.provider.openai.model = model;
        }

        if let Ok(image_model) = std::env::var("CHATDROP_IMAGE_MODEL") {
            self.provider.openai.image_model = image_model;
        }

        if let Ok(policy) = std::env::var("CHATDROP_IMAGE_POLICY") {
            match ImagePolicy::parse_str(&policy) {
                Ok(value) => self.chat.image_policy = value,
                Err(e) => tracing::warn!("Ignoring CHATDROP_IMAGE_POLICY: {}", e),
            }
        }

        if let Ok(mode) = std::env::var("CHATDROP_HISTORY_MODE") {
            match HistoryMode::parse_str(&mode) {
                Ok(value) => self.chat.history_mode = value,
                Err(e) => tracing::warn!("Ignoring CHATDROP_HISTORY_MODE: {}", e),
            }
        }

        if let Ok(max_files) = std::env::var("CHATDROP_MAX_FILES") {
            if let Ok(value) = max_files.parse() {
                self.upload.max_files_per_batch = value;
            } else {
                tracing::warn!("Invalid CHATDROP_MAX_FILES: {}", max_files);
            }
        }

        if let Ok(max_size) = std::env::var("CHATDROP_MAX_FILE_SIZE") {
            if let Ok(value) = max_size.parse() {
                self.upload.max_file_size_bytes = value;
            } else {
                tracing::warn!("Invalid CHATDROP_MAX_FILE_SIZE: {}", max_size);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(model) = &cli.model {
            tracing::debug!("Using chat model {} from the command line", model);
            self.provider.openai.model = model.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(ChatdropError::Config("Provider type cannot be empty".to_string()).into());
        }

        let valid_providers = ["openai"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(ChatdropError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        if self.provider.openai.api_base.is_empty() {
            return Err(
                ChatdropError::Config("provider.openai.api_base cannot be empty".to_string()).into(),
            );
        }

        if self.provider.openai.model.is_empty() {
            return Err(
                ChatdropError::Config("provider.openai.model cannot be empty".to_string()).into(),
            );
        }

        if self.provider.openai.request_timeout_seconds == Some(0) {
            return Err(ChatdropError::Config(
                "provider.openai.request_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.upload.max_files_per_batch == 0 {
            return Err(ChatdropError::Config(
                "upload.max_files_per_batch must be greater than 0".to_string(),
            )
            .into());
        }

        if self.upload.max_file_size_bytes == 0 {
            return Err(ChatdropError::Config(
                "upload.max_file_size_bytes must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider.provider_type, "openai");
        assert_eq!(config.provider.openai.model, "gpt-4o-mini");
        assert_eq!(config.provider.openai.image_model, "dall-e-3");
        assert_eq!(config.upload.max_files_per_batch, 10);
        assert_eq!(config.upload.max_file_size_bytes, 200 * 1024 * 1024);
        assert!(config.upload.deduplicate);
        assert!(config.provider.openai.request_timeout_seconds.is_none());
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_provider() {
        let mut config = Config::default();
        config.provider.provider_type = "copilot".to_string();
        assert!(config.validate().is_err());

        config.provider.provider_type = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_limits() {
        let mut config = Config::default();
        config.upload.max_files_per_batch = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.upload.max_file_size_bytes = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.provider.openai.request_timeout_seconds = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
provider:
  type: openai
  openai:
    api_base: http://localhost:8080/v1
    model: gpt-4o
    request_timeout_seconds: 90

upload:
  max_files_per_batch: 3
  deduplicate: false

chat:
  image_policy: inline
  history_mode: flattened
  attachment_retention: persistent
  allow_empty_submission: false
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.provider.openai.api_base, "http://localhost:8080/v1");
        assert_eq!(config.provider.openai.model, "gpt-4o");
        assert_eq!(config.provider.openai.image_model, "dall-e-3");
        assert_eq!(config.provider.openai.request_timeout_seconds, Some(90));
        assert_eq!(config.upload.max_files_per_batch, 3);
        assert_eq!(config.upload.max_file_size_bytes, DEFAULT_MAX_FILE_SIZE_BYTES);
        assert!(!config.upload.deduplicate);
        assert_eq!(config.chat.image_policy, ImagePolicy::Inline);
        assert_eq!(config.chat.history_mode, HistoryMode::Flattened);
        assert_eq!(
            config.chat.attachment_retention,
            AttachmentRetention::Persistent
        );
        assert!(!config.chat.allow_empty_submission);
    }

    #[test]
    fn test_api_key_is_never_serialized() {
        let mut config = Config::default();
        config.provider.openai.api_key = Some("sk-secret".to_string());
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("sk-secret"));
    }

    #[test]
    fn test_image_policy_parse_str() {
        assert_eq!(
            ImagePolicy::parse_str("Display-Only").unwrap(),
            ImagePolicy::DisplayOnly
        );
        assert_eq!(ImagePolicy::parse_str("inline").unwrap(), ImagePolicy::Inline);
        assert!(ImagePolicy::parse_str("base64").is_err());
    }

    #[test]
    fn test_history_mode_parse_str() {
        assert_eq!(
            HistoryMode::parse_str(" FLATTENED ").unwrap(),
            HistoryMode::Flattened
        );
        assert!(HistoryMode::parse_str("threaded").is_err());
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults_and_env() {
        std::env::set_var("CHATDROP_OPENAI_MODEL", "gpt-4o");
        std::env::set_var("CHATDROP_MAX_FILES", "4");
        std::env::set_var("CHATDROP_IMAGE_POLICY", "not-a-policy");

        let cli = crate::cli::Cli::default();
        let config = Config::load("nonexistent.yaml", &cli).unwrap();

        std::env::remove_var("CHATDROP_OPENAI_MODEL");
        std::env::remove_var("CHATDROP_MAX_FILES");
        std::env::remove_var("CHATDROP_IMAGE_POLICY");

        assert_eq!(config.provider.provider_type, "openai");
        assert_eq!(config.provider.openai.model, "gpt-4o");
        assert_eq!(config.upload.max_files_per_batch, 4);
        assert_eq!(config.chat.image_policy, ImagePolicy::Placeholder);
    }

    #[test]
    #[serial]
    fn test_cli_model_overrides_env() {
        std::env::set_var("CHATDROP_OPENAI_MODEL", "gpt-4o");

        let cli = crate::cli::Cli {
            model: Some("gpt-4.1-mini".to_string()),
            ..crate::cli::Cli::default()
        };
        let config = Config::load("nonexistent.yaml", &cli).unwrap();

        std::env::remove_var("CHATDROP_OPENAI_MODEL");

        assert_eq!(config.provider.openai.model, "gpt-4.1-mini");
    }
}
