use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::env_or;

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_user_agent() -> String {
    format!("utext/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_body_bytes() -> usize {
    5 * 1024 * 1024
}

/// Settings for fetching web pages
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct WebConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Larger responses are rejected instead of truncated
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl WebConfig {
    pub fn new() -> Self {
        Self {
            timeout_ms: env_or("UTEXT_WEB_TIMEOUT_MS", default_timeout_ms()),
            user_agent: env_or("UTEXT_USER_AGENT", default_user_agent()),
            max_body_bytes: env_or("UTEXT_WEB_MAX_BODY_BYTES", default_max_body_bytes()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}
