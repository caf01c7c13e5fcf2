//! Configuration file handling.
//!
//! The config is a YAML file at ~/.voxguard/config.yaml unless `--config`
//! points elsewhere:
//!
//! ```yaml
//! model: /path/to/model.json
//! pipeline:
//!   sample_rate: 16000
//!   duration_secs: 4.0
//!   trim_silence_db: 20.0
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use voxguard_detect::PipelineConfig;

/// Default base configuration directory name.
pub const DEFAULT_BASE_DIR: &str = ".voxguard";
/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Classifier artifact used when `--model` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<PathBuf>,

    /// Pipeline settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Path the config was loaded from (not serialized).
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

impl Config {
    /// Gets the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_BASE_DIR).join(DEFAULT_CONFIG_FILE))
    }

    /// Returns the file this config came from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Parses a YAML document. An empty document yields the defaults.
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Loads the configuration.
///
/// An explicit path must exist. The default path is optional; a missing
/// file yields the defaults.
pub fn load_config(custom_path: Option<&str>) -> anyhow::Result<Config> {
    let (config_path, required) = match custom_path {
        Some(p) => (PathBuf::from(p), true),
        None => match Config::default_config_path() {
            Some(p) => (p, false),
            None => return Ok(Config::default()),
        },
    };

    if !config_path.exists() {
        if required {
            anyhow::bail!("config file {} not found", config_path.display());
        }
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("read config {}", config_path.display()))?;
    let mut cfg = Config::from_yaml(&content)
        .with_context(|| format!("parse config {}", config_path.display()))?;
    cfg.pipeline
        .validate()
        .with_context(|| format!("invalid pipeline in {}", config_path.display()))?;

    // Relative model paths are resolved against the config file's directory.
    if let (Some(model), Some(dir)) = (&cfg.model, config_path.parent()) {
        if model.is_relative() {
            cfg.model = Some(dir.join(model));
        }
    }
    cfg.config_path = Some(config_path);
    Ok(cfg)
}
