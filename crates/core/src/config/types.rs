use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::mission::MissionSettings;
use crate::scoring::ScoringConfig;
use crate::summarizer::{LlmProvider, SummarizerConfig};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub missions: MissionSettings,
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// Narrative summaries. Missions fall back to templated summaries without it.
    #[serde(default)]
    pub summarizer: Option<SummarizerConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Dataset configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasetConfig {
    /// JSON fleet snapshot. The built-in sample fleet is used when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Size of the built-in sample fleet.
    #[serde(default = "default_sample_drivers")]
    pub sample_drivers: usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: None,
            sample_drivers: default_sample_drivers(),
        }
    }
}

fn default_sample_drivers() -> usize {
    30
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub dataset: DatasetConfig,
    pub missions: MissionSettings,
    pub scoring: ScoringConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summarizer: Option<SanitizedSummarizerConfig>,
}

/// Sanitized summarizer config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSummarizerConfig {
    pub provider: LlmProvider,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    pub api_key_configured: bool,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            dataset: config.dataset.clone(),
            missions: config.missions.clone(),
            scoring: config.scoring.clone(),
            summarizer: config
                .summarizer
                .as_ref()
                .map(|s| SanitizedSummarizerConfig {
                    provider: s.provider,
                    model: s.model.clone(),
                    api_base: s.api_base.clone(),
                    api_key_configured: s.api_key.as_ref().is_some_and(|k| !k.is_empty()),
                    max_tokens: s.max_tokens,
                    timeout_secs: s.timeout_secs,
                }),
        }
    }
}
