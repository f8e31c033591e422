use std::fmt;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, TextSpan};

/// Where a piece of text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Accessibility,
    Ocr,
    Web,
    ContinuousOcr,
    Hybrid,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceType::Accessibility => "accessibility",
            SourceType::Ocr => "ocr",
            SourceType::Web => "web",
            SourceType::ContinuousOcr => "continuous_ocr",
            SourceType::Hybrid => "hybrid",
        };
        f.write_str(name)
    }
}

/// One lexical unit of a [`UniversalText`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub bounding_box: Option<BoundingBox>,
    /// Always within `0.0..=1.0`
    pub confidence: f32,
    /// Rank within the owning text
    pub index: usize,
    pub source_type: SourceType,
    /// Byte range into the owning raw text, when known
    pub span: Option<TextSpan>,
}

impl Token {
    pub fn new(text: impl Into<String>, index: usize, source_type: SourceType) -> Self {
        Self {
            text: text.into(),
            bounding_box: None,
            confidence: 1.0,
            index,
            source_type,
            span: None,
        }
    }

    pub fn with_bounding_box(mut self, bounding_box: Option<BoundingBox>) -> Self {
        self.bounding_box = bounding_box;
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        self
    }

    pub fn with_span(mut self, span: Option<TextSpan>) -> Self {
        self.span = span;
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Length of the token text in bytes, the unit spans are measured in
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// 1-based
    pub number: u32,
    pub total: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextMetadata {
    pub title: Option<String>,
    pub url: Option<String>,
    pub language: Option<String>,
    pub confidence: Option<f32>,
    pub capture_duration: Option<Duration>,
    pub page: Option<PageInfo>,
}

/// Canonical text value: raw text plus its tokens.
///
/// Every pipeline stage builds a new value instead of mutating one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniversalText {
    pub raw_text: String,
    pub tokens: Vec<Token>,
    pub source_type: SourceType,
    #[serde(default)]
    pub metadata: TextMetadata,
    pub created_at: SystemTime,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OffsetError {
    #[error("token {index} span {start}..{end} exceeds text length {len}")]
    OutOfBounds {
        index: usize,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("token {index} span {start}..{end} is not a character boundary")]
    NotCharBoundary {
        index: usize,
        start: usize,
        end: usize,
    },

    #[error("token {index} text {expected:?} does not match raw text {found:?}")]
    Mismatch {
        index: usize,
        expected: String,
        found: String,
    },
}

impl UniversalText {
    pub fn new(raw_text: impl Into<String>, tokens: Vec<Token>, source_type: SourceType) -> Self {
        Self {
            raw_text: raw_text.into(),
            tokens,
            source_type,
            metadata: TextMetadata::default(),
            created_at: SystemTime::now(),
        }
    }

    pub fn empty(source_type: SourceType) -> Self {
        Self::new(String::new(), Vec::new(), source_type)
    }

    pub fn with_metadata(mut self, metadata: TextMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Same metadata and timestamp, new content
    pub fn derive(&self, raw_text: impl Into<String>, tokens: Vec<Token>) -> Self {
        Self {
            raw_text: raw_text.into(),
            tokens,
            source_type: self.source_type,
            metadata: self.metadata.clone(),
            created_at: self.created_at,
        }
    }

    /// Same raw text, new token list
    pub fn with_tokens(&self, tokens: Vec<Token>) -> Self {
        self.derive(self.raw_text.clone(), tokens)
    }

    /// Bounding boxes parallel to `tokens`
    pub fn bounding_boxes(&self) -> Vec<Option<BoundingBox>> {
        self.tokens.iter().map(|t| t.bounding_box).collect()
    }

    pub fn is_blank(&self) -> bool {
        self.raw_text.trim().is_empty() && self.tokens.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Slice of raw text covered by a span, if it is valid for this text
    pub fn slice(&self, span: TextSpan) -> Option<&str> {
        self.raw_text.get(span.start..span.end)
    }

    /// Check that every token span points at its own text
    pub fn validate(&self) -> Result<(), OffsetError> {
        let len = self.raw_text.len();
        for token in &self.tokens {
            let Some(span) = token.span else { continue };
            if span.start >= span.end || span.end > len {
                return Err(OffsetError::OutOfBounds {
                    index: token.index,
                    start: span.start,
                    end: span.end,
                    len,
                });
            }
            let found = self
                .slice(span)
                .ok_or(OffsetError::NotCharBoundary {
                    index: token.index,
                    start: span.start,
                    end: span.end,
                })?;
            if found != token.text {
                return Err(OffsetError::Mismatch {
                    index: token.index,
                    expected: token.text.clone(),
                    found: found.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(text: &str, index: usize, start: usize) -> Token {
        Token::new(text, index, SourceType::Web).with_span(TextSpan::new(start, start + text.len()))
    }

    #[test]
    fn test_confidence_is_clamped() {
        let t = Token::new("a", 0, SourceType::Ocr).with_confidence(1.7);
        assert_eq!(t.confidence, 1.0);
        let t = Token::new("a", 0, SourceType::Ocr).with_confidence(-0.2);
        assert_eq!(t.confidence, 0.0);
        let t = Token::new("a", 0, SourceType::Ocr).with_confidence(f32::NAN);
        assert_eq!(t.confidence, 0.0);
    }

    #[test]
    fn test_validate_accepts_matching_spans() {
        let text = UniversalText::new(
            "red blue",
            vec![token("red", 0, 0), token("blue", 1, 4)],
            SourceType::Web,
        );
        assert!(text.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_mismatch() {
        let text = UniversalText::new("red blue", vec![token("blue", 0, 0)], SourceType::Web);
        assert!(matches!(
            text.validate(),
            Err(OffsetError::Mismatch { index: 0, .. })
        ));
    }

    #[test]
    fn test_validate_reports_out_of_bounds() {
        let text = UniversalText::new("red", vec![token("redder", 0, 0)], SourceType::Web);
        assert!(matches!(
            text.validate(),
            Err(OffsetError::OutOfBounds { len: 3, .. })
        ));
    }

    #[test]
    fn test_serializes_source_type_in_snake_case() {
        let json = serde_json::to_string(&SourceType::ContinuousOcr).unwrap();
        assert_eq!(json, "\"continuous_ocr\"");
    }
}
