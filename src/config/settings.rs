//! Configuration settings for the granary service.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub taxonomy: TaxonomyConfig,
    pub storage: StorageConfig,
    pub ingest: IngestConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            // Current directory
            PathBuf::from("granary.toml"),
            PathBuf::from("config.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("granary/config.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".granary/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.model.enabled() {
            if self.model.model.is_empty() {
                return Err(ConfigError::MissingField("model.model".to_string()).into());
            }
            if self.model.timeout_secs == 0 {
                return Err(ConfigError::Invalid("model.timeout_secs must be > 0".to_string()).into());
            }
            if self.model.max_prompt_bytes == 0 {
                return Err(
                    ConfigError::Invalid("model.max_prompt_bytes must be > 0".to_string()).into(),
                );
            }
        }

        if self.storage.backend == StorageBackendType::Jsonl && self.storage.data_dir.is_empty() {
            return Err(ConfigError::MissingField("storage.data_dir".to_string()).into());
        }

        if self.ingest.max_concurrent_classifications == 0 {
            return Err(ConfigError::Invalid(
                "ingest.max_concurrent_classifications must be > 0".to_string(),
            )
            .into());
        }

        Ok(())
    }

    /// Expand the data directory path.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let expanded = shellexpand::tilde(&self.storage.data_dir);
        Ok(PathBuf::from(expanded.as_ref()))
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub bind: String,
    /// HTTP port.
    pub port: u16,
    /// Enable CORS for the API routes.
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 5000,
            enable_cors: true,
        }
    }
}

/// Remote classification model configuration.
///
/// Leaving `base_url` empty disables the remote path entirely; the
/// classifier then runs on the local heuristic alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL of an OpenAI-compatible chat completions API.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// API key (loaded from the GRANARY_API_KEY environment variable if not set).
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Byte budget for the description placed into the prompt.
    pub max_prompt_bytes: usize,
}

impl ModelConfig {
    /// Whether a remote endpoint is configured at all.
    pub fn enabled(&self) -> bool {
        !self.base_url.trim().is_empty()
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            timeout_secs: 20,
            max_prompt_bytes: 16 * 1024,
        }
    }
}

/// Taxonomy source configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TaxonomyConfig {
    /// Path to a taxonomy TOML file. Unset means the builtin taxonomy.
    pub file: Option<String>,
}

/// Grant storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend type: "memory" or "jsonl".
    pub backend: StorageBackendType,
    /// Data directory for the jsonl backend.
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendType::Memory,
            data_dir: "~/.local/share/granary".to_string(),
        }
    }
}

/// Storage backend type enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendType {
    #[default]
    Memory,
    Jsonl,
}

/// Ingestion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Maximum number of classifications running concurrently in a batch.
    pub max_concurrent_classifications: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_concurrent_classifications: 4,
        }
    }
}
