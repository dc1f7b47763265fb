//! Configuration loading for the narration engine.
//!
//! All user-tunable settings are centralized here and loaded from
//! `conf/config.toml` if present. Any missing or invalid entries fall back to
//! sensible defaults so the engine can still start with nothing but an API
//! key in the environment.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Environment variable consulted when `api_key` is absent from the file.
pub const API_KEY_ENV: &str = "ELEVENLABS_API_KEY";

/// High-level engine configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct NarratorConfig {
    /// Provider credential. Usually left unset in the file and supplied via
    /// the `ELEVENLABS_API_KEY` environment variable instead.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: f64,
    #[serde(default = "default_rate")]
    pub rate: f32,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        NarratorConfig {
            api_key: None,
            voice_id: default_voice_id(),
            model_id: default_model_id(),
            batch_size: default_batch_size(),
            words_per_minute: default_words_per_minute(),
            rate: default_rate(),
            volume: default_volume(),
            poll_interval_ms: default_poll_interval_ms(),
            log_level: default_log_level(),
        }
    }
}

impl NarratorConfig {
    /// Resolve the provider credential from the file or the environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty()))
    }
}

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> NarratorConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return NarratorConfig::default();
        }
    };

    match toml::from_str::<NarratorConfig>(&contents) {
        Ok(cfg) => {
            debug!("Parsed configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err}");
            NarratorConfig::default()
        }
    }
}

fn default_voice_id() -> String {
    "21m00Tcm4TlvDq8ikWAM".to_string()
}

fn default_model_id() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_batch_size() -> usize {
    8
}

fn default_words_per_minute() -> f64 {
    150.0
}

fn default_rate() -> f32 {
    1.0
}

fn default_volume() -> f32 {
    0.75
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: NarratorConfig = toml::from_str("voice_id = \"abc\"").expect("valid toml");
        assert_eq!(cfg.voice_id, "abc");
        assert_eq!(cfg.batch_size, 8);
        assert!((cfg.words_per_minute - 150.0).abs() < f64::EPSILON);
        assert_eq!(cfg.log_level, LogLevel::Info);
    }

    #[test]
    fn blank_file_key_falls_through() {
        let cfg: NarratorConfig = toml::from_str("api_key = \"  \"").expect("valid toml");
        // Whitespace-only keys in the file must not shadow the environment.
        assert_eq!(
            cfg.resolved_api_key(),
            env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty())
        );
    }
}
