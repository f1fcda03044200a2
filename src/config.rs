use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{RatescoutError, Result};
use crate::extract::ExtractOptions;
use crate::normalize::DEFAULT_TEXT_LIMIT;

/// Global ratescout configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Local model used to repair incomplete extractions
    #[serde(default)]
    pub llm: LlmConfig,

    /// Record assembly options
    #[serde(default)]
    pub extract: ExtractOptions,
}

/// Settings for the Ollama-backed fallback normalizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model tag as listed by `ollama list`
    #[serde(default = "default_model")]
    pub model: String,

    /// Ollama server base URL
    #[serde(default = "default_host")]
    pub host: String,

    /// Hard wall-clock budget per model call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,

    /// Maximum characters of page text sent to the model
    #[serde(default = "default_text_limit")]
    pub text_limit: usize,

    /// Below this many characters the model is not called at all
    #[serde(default = "default_min_text_len")]
    pub min_text_len: usize,

    #[serde(default)]
    pub temperature: f32,

    /// Context window, in tokens
    #[serde(default = "default_num_ctx")]
    pub num_ctx: u32,

    /// Output cap, in tokens
    #[serde(default = "default_num_predict")]
    pub num_predict: u32,
}

fn default_model() -> String {
    "qwen3:4b".to_string()
}

fn default_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_timeout_secs() -> f64 {
    2.0
}

fn default_timeout() -> Duration {
    Duration::from_secs_f64(default_timeout_secs())
}

fn default_text_limit() -> usize {
    DEFAULT_TEXT_LIMIT
}

fn default_min_text_len() -> usize {
    50
}

fn default_num_ctx() -> u32 {
    4096
}

fn default_num_predict() -> u32 {
    400
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            host: default_host(),
            timeout_secs: default_timeout_secs(),
            text_limit: default_text_limit(),
            min_text_len: default_min_text_len(),
            temperature: 0.0,
            num_ctx: default_num_ctx(),
            num_predict: default_num_predict(),
        }
    }
}

/// Upper bound on the per-call model budget, in seconds
pub const MAX_TIMEOUT_SECS: f64 = 3600.0;

impl LlmConfig {
    /// Per-call budget. Values `validate` would reject are clamped into range.
    pub fn timeout(&self) -> Duration {
        let secs = self.timeout_secs.clamp(0.0, MAX_TIMEOUT_SECS);
        Duration::try_from_secs_f64(secs).unwrap_or_else(|_| default_timeout())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.timeout_secs.is_finite()
            || self.timeout_secs <= 0.0
            || self.timeout_secs > MAX_TIMEOUT_SECS
        {
            return Err(RatescoutError::ConfigError(format!(
                "llm.timeout_secs must be a positive number of seconds up to {}, got {}",
                MAX_TIMEOUT_SECS, self.timeout_secs
            )));
        }
        if self.model.trim().is_empty() {
            return Err(RatescoutError::ConfigError("llm.model must not be empty".into()));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load and validate a specific config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.llm.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&config_path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RatescoutError::ConfigError(e.to_string()))
    }

    /// Get the config file path
    ///
    /// Supports RATESCOUT_CONFIG environment variable for alternate files
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("RATESCOUT_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let dirs = ProjectDirs::from("", "", "ratescout").ok_or_else(|| {
            RatescoutError::ConfigError("Could not determine config directory".into())
        })?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::MetricPrecedence;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.llm.model, "qwen3:4b");
        assert_eq!(config.llm.timeout(), Duration::from_secs(2));
        assert_eq!(config.llm.text_limit, 3000);
        assert_eq!(config.llm.min_text_len, 50);
        assert_eq!(config.llm.num_ctx, 4096);
        assert_eq!(config.llm.num_predict, 400);
        assert_eq!(config.extract.metric_precedence, MetricPrecedence::LastWins);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [llm]
            timeout_secs = 0.5

            [extract]
            metric_precedence = "first_wins"
            "#,
        )
        .unwrap();
        assert_eq!(config.llm.timeout(), Duration::from_millis(500));
        assert_eq!(config.llm.host, "http://localhost:11434");
        assert_eq!(config.extract.metric_precedence, MetricPrecedence::FirstWins);
    }

    #[test]
    fn test_rejects_non_positive_timeout() {
        let mut llm = LlmConfig::default();
        llm.timeout_secs = 0.0;
        assert!(llm.validate().is_err());
        llm.timeout_secs = f64::NAN;
        assert!(llm.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_timeout() {
        let mut llm = LlmConfig::default();
        llm.timeout_secs = 1e20;
        assert!(llm.validate().is_err());
        llm.timeout_secs = MAX_TIMEOUT_SECS;
        assert!(llm.validate().is_ok());
    }

    #[test]
    fn test_timeout_never_panics() {
        let mut llm = LlmConfig::default();
        llm.timeout_secs = 1e20;
        assert_eq!(llm.timeout(), Duration::from_secs(3600));
        llm.timeout_secs = f64::NAN;
        assert_eq!(llm.timeout(), Duration::from_secs(2));
        llm.timeout_secs = -1.0;
        assert_eq!(llm.timeout(), Duration::ZERO);
    }

    #[test]
    fn test_oversized_timeout_in_file_rejected() {
        let path = std::env::temp_dir().join(format!("ratescout-timeout-{}.toml", std::process::id()));
        std::fs::write(&path, "[llm]\ntimeout_secs = 1e20\n").unwrap();
        let result = Config::load_from(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(RatescoutError::ConfigError(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let text = Config::default().to_toml().unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.llm.model, "qwen3:4b");
    }
}
