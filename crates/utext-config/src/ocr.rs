use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::env_or;

fn default_language() -> String {
    "en".to_string()
}

fn default_min_confidence() -> f32 {
    0.0
}

fn default_continuous_interval_ms() -> u64 {
    2000
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OcrConfig {
    /// BCP-47 tag handed to the OCR engine
    #[serde(default = "default_language")]
    pub language: String,
    /// Words recognised below this confidence are discarded
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
    /// Delay between continuous capture cycles
    #[serde(default = "default_continuous_interval_ms")]
    pub continuous_interval_ms: u64,
}

impl OcrConfig {
    pub fn new() -> Self {
        Self {
            language: env_or("UTEXT_OCR_LANGUAGE", default_language()),
            min_confidence: env_or("UTEXT_OCR_MIN_CONFIDENCE", default_min_confidence()),
            continuous_interval_ms: env_or(
                "UTEXT_CONTINUOUS_INTERVAL_MS",
                default_continuous_interval_ms(),
            ),
        }
    }

    pub fn continuous_interval(&self) -> Duration {
        Duration::from_millis(self.continuous_interval_ms)
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            min_confidence: default_min_confidence(),
            continuous_interval_ms: default_continuous_interval_ms(),
        }
    }
}
