//! Configuration types for the command engine.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dispatch::DEFAULT_CLIPBOARD_KEYWORDS;
use crate::error::{Result, WandError};
use crate::respond::{DEFAULT_TRANSFORM_PROMPT, GeminiBackend, GeminiConfig, ModelBackend};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WandConfig {
    /// AI model tier settings.
    pub model: ModelConfig,
    /// Command history settings.
    pub history: HistoryConfig,
    /// Execution policy for submitted commands.
    pub dispatch: DispatchConfig,
}

/// AI model backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Whether to use the model tier at all.
    pub enabled: bool,
    /// Gemini model identifier.
    pub model: String,
    /// API base URL.
    pub api_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Prompt template for text transforms (`{command}`, `{text}`).
    pub transform_prompt: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gemini-1.5-flash".to_owned(),
            api_url: "https://generativelanguage.googleapis.com".to_owned(),
            api_key_env: "GEMINI_API_KEY".to_owned(),
            timeout_secs: 30,
            transform_prompt: DEFAULT_TRANSFORM_PROMPT.to_owned(),
        }
    }
}

impl ModelConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }

    /// Build the model backend from the environment.
    ///
    /// `Ok(None)` means the model tier is unconfigured (disabled or no key);
    /// that is an expected state, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`WandError::Config`] if a key is present but the backend
    /// cannot be constructed.
    pub fn build_backend(&self) -> Result<Option<Arc<dyn ModelBackend>>> {
        self.build_backend_with_key(self.api_key())
    }

    /// Like [`build_backend`](Self::build_backend) with an explicit key.
    pub fn build_backend_with_key(
        &self,
        api_key: Option<String>,
    ) -> Result<Option<Arc<dyn ModelBackend>>> {
        let Some(api_key) = api_key.filter(|_| self.enabled) else {
            return Ok(None);
        };
        let config = GeminiConfig::new(api_key, self.model.clone())
            .with_base_url(self.api_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs.max(1)));
        let backend = GeminiBackend::new(config).map_err(|e| WandError::Config(e.to_string()))?;
        Ok(Some(Arc::new(backend)))
    }
}

/// Command history configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub enabled: bool,
    /// Database path (None = `<data dir>/history.db`).
    pub path: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl HistoryConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(crate::wand_dirs::history_db_path)
    }
}

/// How submitted commands are scheduled relative to each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchOrdering {
    /// One task per command; no ordering between overlapping commands.
    #[default]
    Concurrent,
    /// Bounded FIFO queue drained by a single worker.
    Serial,
}

/// Execution policy for submitted commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub ordering: DispatchOrdering,
    /// Queue depth in serial mode.
    pub queue_capacity: usize,
    /// Per-command timeout in seconds (None = no timeout).
    pub command_timeout_secs: Option<u64>,
    /// Transform keywords that mark a result for the clipboard.
    pub clipboard_keywords: Vec<String>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            ordering: DispatchOrdering::Concurrent,
            queue_capacity: 64,
            command_timeout_secs: None,
            clipboard_keywords: DEFAULT_CLIPBOARD_KEYWORDS
                .iter()
                .map(|k| (*k).to_owned())
                .collect(),
        }
    }
}

impl DispatchConfig {
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }
}

impl WandConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| WandError::Config(e.to_string()))
    }

    /// Load `path` if it exists, otherwise the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| WandError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `<config dir>/config.toml`.
    pub fn default_config_path() -> PathBuf {
        crate::wand_dirs::config_dir().join("config.toml")
    }
}
