use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub remote: RemoteConfig,
    pub storage: StorageConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RemoteConfig {
    /// Scoring endpoint that receives the feature vector.
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    /// Path of the JSON key-value store backing the durable block set,
    /// scan stats, options, and the enabled flag.
    pub state_path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

/// Per-scan options record. Owned by the UI layer and persisted under the
/// `options` storage key; the heuristic classifier reads it to decide which
/// gated signals contribute to scoring.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Skip links that sit inside navigation chrome (nav/header/footer).
    #[serde(default = "default_true")]
    pub flag_navigation_links: bool,
    /// Let URL length over the threshold contribute to the score.
    #[serde(default = "default_true")]
    pub flag_long_urls: bool,
    /// Let suspicious login/credential keywords contribute to the score.
    #[serde(default = "default_true")]
    pub flag_login_keywords: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            flag_navigation_links: true,
            flag_long_urls: true,
            flag_login_keywords: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: RemoteConfig {
                endpoint: "http://127.0.0.1:8000/predict".to_string(),
                timeout_seconds: Some(10),
            },
            storage: StorageConfig {
                state_path: "/var/lib/linkshield/state.json".to_string(),
            },
            logging: Some(LoggingConfig {
                level: "info".to_string(),
            }),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    pub fn generate(path: &str) -> Result<()> {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).context("Failed to serialize config")?;
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
            }
        }
        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {path}"))?;
        Ok(())
    }
}
