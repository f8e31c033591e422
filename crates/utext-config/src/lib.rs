use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use self::accessibility::AccessibilityConfig;
use self::normalization::NormalizationConfig;
use self::ocr::OcrConfig;
use self::speech::SpeechConfig;
use self::web::WebConfig;

pub mod accessibility;
pub mod normalization;
pub mod ocr;
pub mod speech;
pub mod web;

pub use normalization::TokenizeMode;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub accessibility: AccessibilityConfig,
    pub ocr: OcrConfig,
    pub web: WebConfig,
    pub speech: SpeechConfig,
    pub normalization: NormalizationConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Config {
    /// Defaults overridden by `UTEXT_*` environment variables
    pub fn new() -> Self {
        Config {
            accessibility: AccessibilityConfig::new(),
            ocr: OcrConfig::new(),
            web: WebConfig::new(),
            speech: SpeechConfig::new(),
            normalization: NormalizationConfig::default(),
        }
    }

    /// Load a JSON profile. Missing sections and fields fall back to defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        tracing::info!("Loading config from {}", path.display());
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Parse an environment variable, keeping `default` when unset or malformed
pub(crate) fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring malformed {name}={raw:?}");
            default
        }),
        Err(_) => default,
    }
}
