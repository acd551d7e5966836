//! Engine configuration
//!
//! Configuration is embedded at build time from config.toml. Two
//! environment variables override it at startup: `SONO_CLASSIFIER_URL`
//! (classification endpoint) and `SONO_BACKEND` (backend variant).

use serde::Deserialize;
use std::env;
use std::time::Duration;
use url::Url;

use crate::backend::BackendKind;

/// Top-level application configuration
#[derive(Debug, Deserialize)]
pub(crate) struct Config {
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Remote classifier endpoint settings
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ClassifierConfig {
    /// HTTP endpoint receiving one multipart POST per accepted segment
    pub endpoint: String,
}

/// Segment capture loop settings
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CaptureConfig {
    /// Fixed duration of one recorded segment
    #[serde(default = "default_segment_ms")]
    pub segment_ms: u64,
    /// Delay between stopping one segment and starting the next
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Segments smaller than this many WAV bytes are treated as silence
    #[serde(default = "default_min_segment_bytes")]
    pub min_segment_bytes: usize,
    /// Target sample rate for captured audio
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SessionConfig {
    /// Backend variant used when none is given in the environment
    #[serde(default)]
    pub backend: BackendKind,
}

fn default_segment_ms() -> u64 {
    4000
}

fn default_settle_ms() -> u64 {
    200
}

fn default_min_segment_bytes() -> usize {
    1000
}

fn default_sample_rate() -> u32 {
    16_000
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            segment_ms: default_segment_ms(),
            settle_ms: default_settle_ms(),
            min_segment_bytes: default_min_segment_bytes(),
            sample_rate: default_sample_rate(),
        }
    }
}

impl CaptureConfig {
    pub fn segment_duration(&self) -> Duration {
        Duration::from_millis(self.segment_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Config {
    /// Parsed and validated classifier endpoint
    pub fn classifier_url(&self) -> Result<Url, ConfigError> {
        Ok(Url::parse(&self.classifier.endpoint)?)
    }
}

/// Load configuration from the embedded config.toml plus env overrides
pub(crate) fn load() -> Result<Config, ConfigError> {
    const CONFIG_TOML: &str = include_str!("../config.toml");
    let mut config: Config = toml::from_str(CONFIG_TOML)?;

    if let Ok(endpoint) = env::var("SONO_CLASSIFIER_URL") {
        config.classifier.endpoint = endpoint;
    }
    if let Ok(kind) = env::var("SONO_BACKEND") {
        config.session.backend = kind.parse()?;
    }

    // Fail fast on a bad endpoint rather than at the first segment upload
    config.classifier_url()?;

    Ok(config)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid classifier endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("Unknown backend '{0}' (expected demo, recognizer-only, or remote)")]
    UnknownBackend(String),
}
