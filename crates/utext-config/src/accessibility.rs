use serde::{Deserialize, Serialize};

use crate::env_or;

fn default_max_depth() -> usize {
    40
}

fn default_max_tokens() -> usize {
    600
}

/// Limits for accessibility tree walks
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AccessibilityConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl AccessibilityConfig {
    pub fn new() -> Self {
        Self {
            max_depth: env_or("UTEXT_A11Y_MAX_DEPTH", default_max_depth()),
            max_tokens: env_or("UTEXT_A11Y_MAX_TOKENS", default_max_tokens()),
        }
    }
}

impl Default for AccessibilityConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_tokens: default_max_tokens(),
        }
    }
}
