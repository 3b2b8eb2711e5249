//! Configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Main ocrclean configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Chunking, retry and resume settings
    pub pipeline: PipelineConfig,

    /// Dataset locations and profile presets
    pub paths: PathsConfig,
}

impl Config {
    /// Validate configuration before a correction run
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        self.pipeline.validate()
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local config: .ocrclean.yml
        let local_config = PathBuf::from(".ocrclean.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // User config: ~/.config/ocrclean/ocrclean.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("ocrclean").join("ocrclean.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialised
    ///
    /// Errors are swallowed: the full load reports them once logging is up.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => {
                let mut paths = vec![PathBuf::from(".ocrclean.yml")];
                if let Some(dir) = dirs::config_dir() {
                    paths.push(dir.join("ocrclean").join("ocrclean.yml"));
                }
                paths
            }
        };

        candidates
            .iter()
            .find(|p| p.exists())
            .and_then(|p| Self::load_from_file(p).ok())
            .and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "openai" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Sampling temperature
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com".to_string(),
            max_tokens: 4096,
            timeout_ms: 120_000,
            temperature: 0.1,
        }
    }
}

/// Chunking, retry and resume settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum words per chunk sent to the oracle
    #[serde(rename = "word-limit")]
    pub word_limit: usize,

    /// Attempts per chunk before the record is abandoned
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Fixed delay between attempts in milliseconds
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Process only the first N source rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<usize>,

    /// Skip records already present in the checkpoint or output
    pub resume: bool,

    /// Trailing fraction of a truncated answer searched for a sentence end
    #[serde(rename = "snap-window")]
    pub snap_window: f64,

    /// Kind of document named in the prompts
    #[serde(rename = "source-kind")]
    pub source_kind: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            word_limit: crate::DEFAULT_WORD_LIMIT,
            max_retries: 3,
            retry_delay_ms: 5_000,
            sample: None,
            resume: true,
            snap_window: 0.2,
            source_kind: "historical newspaper".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.word_limit == 0 {
            return Err(eyre::eyre!("pipeline.word-limit must be at least 1"));
        }
        if self.max_retries == 0 {
            return Err(eyre::eyre!("pipeline.max-retries must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.snap_window) {
            return Err(eyre::eyre!(
                "pipeline.snap-window must be between 0 and 1, got {}",
                self.snap_window
            ));
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Dataset locations and the default profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the source, output and checkpoint files
    #[serde(rename = "data-dir")]
    pub data_dir: PathBuf,

    /// Directory holding progression logs
    #[serde(rename = "log-dir")]
    pub log_dir: PathBuf,

    /// Profile used when none is given on the command line
    pub profile: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("datasets"),
            log_dir: PathBuf::from("."),
            profile: "historical".to_string(),
        }
    }
}

impl PathsConfig {
    /// Preset file locations for a named profile
    pub fn preset(&self, profile: &str) -> RunPaths {
        debug!(%profile, "PathsConfig::preset: called");
        RunPaths {
            source: self.data_dir.join(format!("{profile}_regex_cleaned.csv")),
            destination: self.data_dir.join(format!("{profile}_gpt4o_regex_cleaned.csv")),
            checkpoint: self.data_dir.join(format!("{profile}_checkpoint.txt")),
            progression: self.log_dir.join(format!("PROGRESSION_{profile}.txt")),
        }
    }

    /// Raw input and cleaned output for the regex cleaning stage
    pub fn clean_preset(&self, profile: &str) -> (PathBuf, PathBuf) {
        (
            self.data_dir.join(format!("{profile}.csv")),
            self.data_dir.join(format!("{profile}_regex_cleaned.csv")),
        )
    }
}

/// The four files one correction run touches
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunPaths {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub checkpoint: PathBuf,
    pub progression: PathBuf,
}

/// Explicit paths from the command line; each one beats the preset
#[derive(Debug, Clone, Default)]
pub struct PathOverrides {
    pub source: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub checkpoint: Option<PathBuf>,
    pub progression: Option<PathBuf>,
}

impl RunPaths {
    /// Resolve the profile preset, then apply overrides field by field
    pub fn resolve(paths: &PathsConfig, profile: Option<&str>, overrides: PathOverrides) -> Self {
        let profile = profile.unwrap_or(&paths.profile);
        debug!(%profile, ?overrides, "RunPaths::resolve: called");
        let preset = paths.preset(profile);
        Self {
            source: overrides.source.unwrap_or(preset.source),
            destination: overrides.destination.unwrap_or(preset.destination),
            checkpoint: overrides.checkpoint.unwrap_or(preset.checkpoint),
            progression: overrides.progression.unwrap_or(preset.progression),
        }
    }
}
