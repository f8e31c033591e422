use std::error::Error as StdError;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::node::UiNode;
use crate::text::UniversalText;

pub type SharedError = Arc<dyn StdError + Send + Sync>;

/// Outcome of one extraction attempt.
///
/// `Empty` means the source was read fine but held no text; `Error` means
/// reading it failed. Callers branch on which.
#[derive(Debug, Clone)]
pub enum TextDetectionResult {
    Success(UniversalText),
    Empty,
    Error {
        message: String,
        cause: Option<SharedError>,
    },
}

impl TextDetectionResult {
    /// `Empty` for blank text, `Success` otherwise
    pub fn from_text(text: UniversalText) -> Self {
        if text.is_blank() {
            TextDetectionResult::Empty
        } else {
            TextDetectionResult::Success(text)
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        TextDetectionResult::Error {
            message: message.into(),
            cause: None,
        }
    }

    pub fn error_with<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        TextDetectionResult::Error {
            message: message.into(),
            cause: Some(Arc::new(cause)),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TextDetectionResult::Success(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TextDetectionResult::Empty)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TextDetectionResult::Error { .. })
    }

    pub fn text(&self) -> Option<&UniversalText> {
        match self {
            TextDetectionResult::Success(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<UniversalText> {
        match self {
            TextDetectionResult::Success(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Uncompressed 8-bit RGBA, row-major
    Rgba8,
    Png,
    Jpeg,
}

/// A captured or decoded bitmap handed to OCR
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

impl ImageData {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() || self.width == 0 || self.height == 0
    }
}

/// Inputs available to auto-detection. Carries everything explicitly so
/// no extractor has to reach for a process-wide service handle.
#[derive(Debug, Clone, Default)]
pub struct DetectionContext {
    pub url: Option<String>,
    pub bitmap: Option<ImageData>,
    /// Snapshot of the current accessibility tree, `None` when the service is unavailable
    pub accessibility: Option<UiNode>,
    pub continuous: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::SourceType;

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn test_blank_text_is_empty() {
        let result = TextDetectionResult::from_text(UniversalText::empty(SourceType::Ocr));
        assert!(result.is_empty());
    }

    #[test]
    fn test_error_keeps_cause() {
        let result = TextDetectionResult::error_with("capture failed", Boom);
        match result {
            TextDetectionResult::Error { message, cause } => {
                assert_eq!(message, "capture failed");
                assert_eq!(cause.unwrap().to_string(), "boom");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
