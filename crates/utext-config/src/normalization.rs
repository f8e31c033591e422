use serde::{Deserialize, Serialize};

/// Granularity tokens are re-segmented into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizeMode {
    Character,
    #[default]
    Word,
    Sentence,
    Paragraph,
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

/// Selects which normalizer stages run
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct NormalizationConfig {
    #[serde(default = "default_true")]
    pub remove_duplicates: bool,
    #[serde(default = "default_true")]
    pub normalize_formatting: bool,
    #[serde(default = "default_true")]
    pub order_by_reading: bool,
    #[serde(default = "default_false")]
    pub filter_noise: bool,
    /// Only consulted when `filter_noise` is on
    #[serde(default = "default_true")]
    pub keep_headers: bool,
    /// Only consulted when `filter_noise` is on
    #[serde(default = "default_false")]
    pub keep_navigation: bool,
    pub tokenize_by: TokenizeMode,
    #[serde(default = "default_true")]
    pub map_positions: bool,
    /// Tokens below this confidence are dropped
    pub min_confidence: f32,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            remove_duplicates: true,
            normalize_formatting: true,
            order_by_reading: true,
            filter_noise: false,
            keep_headers: true,
            keep_navigation: false,
            tokenize_by: TokenizeMode::Word,
            map_positions: true,
            min_confidence: 0.0,
        }
    }
}
