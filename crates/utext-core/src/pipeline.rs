use utext_config::normalization::NormalizationConfig;
use utext_types::UniversalText;

use crate::dedup::remove_duplicates;
use crate::format::normalize_formatting;
use crate::merge::merge;
use crate::noise::NoiseFilter;
use crate::order::order_by_reading_sequence;
use crate::positions::map_positions_with;
use crate::tokenize::tokenize;

/// Runs the normalizer stages in their fixed order:
/// merge, dedup, formatting, reading order, noise, confidence, tokenize, positions.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizationConfig,
    noise: NoiseFilter,
}

impl Normalizer {
    pub fn new(config: NormalizationConfig) -> Self {
        Self {
            config,
            noise: NoiseFilter::default(),
        }
    }

    pub fn with_noise_filter(mut self, noise: NoiseFilter) -> Self {
        self.noise = noise;
        self
    }

    pub fn config(&self) -> &NormalizationConfig {
        &self.config
    }

    pub fn normalize(&self, sources: &[UniversalText]) -> UniversalText {
        let config = &self.config;
        let mut text = merge(sources);

        if config.remove_duplicates {
            text = remove_duplicates(&text);
        }
        if config.normalize_formatting {
            text = normalize_formatting(&text);
        }
        if config.order_by_reading {
            text = order_by_reading_sequence(&text);
        }
        if config.filter_noise {
            text = self
                .noise
                .apply(&text, config.keep_headers, config.keep_navigation);
        }
        if config.min_confidence > 0.0 {
            let kept = text
                .tokens
                .iter()
                .filter(|t| t.confidence >= config.min_confidence)
                .cloned()
                .collect();
            text = text.with_tokens(kept);
        }

        let reference = text.clone();
        text = tokenize(&text, config.tokenize_by);
        if config.map_positions {
            text = map_positions_with(&text, &reference);
        }

        tracing::debug!(
            "[NORMALIZE] Normalized {} sources into {} tokens, {} bytes",
            sources.len(),
            text.tokens.len(),
            text.raw_text.len()
        );
        text
    }
}

/// One-shot [`Normalizer::normalize`] with the default noise filter
pub fn normalize(sources: &[UniversalText], config: &NormalizationConfig) -> UniversalText {
    Normalizer::new(config.clone()).normalize(sources)
}

#[cfg(test)]
mod tests {
    use utext_config::TokenizeMode;
    use utext_types::{BoundingBox, SourceType, TextBuilder};

    use super::*;

    fn at(left: f32, top: f32) -> Option<BoundingBox> {
        BoundingBox::new(left, top, left + 30.0, top + 10.0)
    }

    fn screen() -> UniversalText {
        let mut b = TextBuilder::new(SourceType::Accessibility);
        b.push_word("world", at(40.0, 0.0), 1.0);
        b.push_word("Hello", at(0.0, 0.0), 1.0);
        b.end_line();
        b.push_word("Advertisement", at(0.0, 20.0), 1.0);
        b.finish()
    }

    fn capture() -> UniversalText {
        let mut b = TextBuilder::new(SourceType::Ocr);
        b.push_word("Hello", at(0.0, 0.0), 0.9);
        b.push_word("blurry", at(0.0, 40.0), 0.1);
        b.finish()
    }

    #[test]
    fn test_full_pipeline_keeps_offsets_valid() {
        let config = NormalizationConfig {
            filter_noise: true,
            ..NormalizationConfig::default()
        };
        let text = normalize(&[screen(), capture()], &config);

        assert_eq!(text.source_type, SourceType::Hybrid);
        assert_eq!(text.raw_text, "Hello world blurry");
        assert!(text.validate().is_ok());
    }

    #[test]
    fn test_min_confidence_drops_weak_tokens() {
        let config = NormalizationConfig {
            min_confidence: 0.5,
            ..NormalizationConfig::default()
        };
        let text = normalize(&[capture()], &config);
        let words: Vec<&str> = text.tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(words, vec!["Hello"]);
        assert!(text.validate().is_ok());
    }

    #[test]
    fn test_disabled_stages_leave_text_alone() {
        let config = NormalizationConfig {
            remove_duplicates: false,
            normalize_formatting: false,
            order_by_reading: false,
            filter_noise: false,
            map_positions: false,
            ..NormalizationConfig::default()
        };
        let source = screen();
        assert_eq!(normalize(std::slice::from_ref(&source), &config), source);
    }

    #[test]
    fn test_custom_noise_filter_replaces_defaults() {
        let config = NormalizationConfig {
            filter_noise: true,
            ..NormalizationConfig::default()
        };
        let noise = NoiseFilter {
            always: vec!["world".into()],
            navigation: Vec::new(),
            headers: Vec::new(),
        };
        let text = Normalizer::new(config).with_noise_filter(noise).normalize(&[screen()]);

        assert_eq!(text.raw_text, "Hello Advertisement");
        assert!(text.validate().is_ok());
    }

    #[test]
    fn test_sentence_tokens_get_boxes() {
        let config = NormalizationConfig {
            tokenize_by: TokenizeMode::Sentence,
            ..NormalizationConfig::default()
        };
        let text = normalize(&[screen()], &config);
        assert_eq!(text.tokens.len(), 1);
        assert!(text.tokens[0].bounding_box.is_some());
        assert!(text.validate().is_ok());
    }
}
