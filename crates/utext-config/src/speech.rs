use serde::{Deserialize, Serialize};

use crate::env_or;

fn default_rate() -> f32 {
    1.0
}

fn default_pitch() -> f32 {
    1.0
}

fn default_highlight_sentences() -> bool {
    false
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SpeechConfig {
    /// 1.0 is the engine's normal speed
    #[serde(default = "default_rate")]
    pub rate: f32,
    #[serde(default = "default_pitch")]
    pub pitch: f32,
    /// Emit a sentence highlight whenever playback enters a new sentence
    #[serde(default = "default_highlight_sentences")]
    pub highlight_sentences: bool,
}

impl SpeechConfig {
    pub fn new() -> Self {
        Self {
            rate: env_or("UTEXT_SPEECH_RATE", default_rate()),
            pitch: env_or("UTEXT_SPEECH_PITCH", default_pitch()),
            highlight_sentences: env_or(
                "UTEXT_HIGHLIGHT_SENTENCES",
                default_highlight_sentences(),
            ),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            rate: default_rate(),
            pitch: default_pitch(),
            highlight_sentences: default_highlight_sentences(),
        }
    }
}
