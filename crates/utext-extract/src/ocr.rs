use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use utext_config::ocr::OcrConfig;
use utext_types::{
    BoundingBox, ImageData, SourceType, TextBuilder, TextDetectionResult, TextMetadata,
    UniversalText,
};

use crate::error::OcrError;
use crate::extractor::TextExtractor;

/// One recognised word
#[derive(Debug, Clone, PartialEq)]
pub struct OcrWord {
    pub text: String,
    pub bounding_box: Option<BoundingBox>,
    pub confidence: f32,
    /// Words sharing a line index are joined with spaces
    pub line: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrOutput {
    pub words: Vec<OcrWord>,
    pub language: Option<String>,
}

/// On-device text recognition
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognize words in an image, e.g. language "en" or "ja"
    async fn recognize(&self, image: &ImageData, language: &str) -> Result<OcrOutput, OcrError>;

    /// Name of this engine (for diagnostics)
    fn name(&self) -> &str;
}

/// Recognition for content the app cannot decode itself (content/file/resource URIs)
#[async_trait]
pub trait BackendOcr: Send + Sync {
    async fn recognize_uri(&self, uri: &str, language: &str) -> Result<OcrOutput, OcrError>;
}

#[derive(Debug, Clone)]
pub enum OcrSource {
    Image(ImageData),
    Uri(String),
    FilePath(PathBuf),
    Screenshot,
}

/// Build a text from recognised words, dropping those under `min_confidence`
pub fn assemble(output: OcrOutput, min_confidence: f32, source_type: SourceType) -> UniversalText {
    let mut words = output.words;
    words.sort_by_key(|w| w.line);

    let mut builder = TextBuilder::new(source_type);
    let mut current_line = None;
    let mut confidence_sum = 0.0f32;
    for word in words.iter().filter(|w| w.confidence >= min_confidence) {
        if current_line.is_some_and(|line| line != word.line) {
            builder.end_line();
        }
        current_line = Some(word.line);
        if builder
            .push_word(&word.text, word.bounding_box, word.confidence)
            .is_some()
        {
            confidence_sum += word.confidence.clamp(0.0, 1.0);
        }
    }

    let kept = builder.token_count();
    let text = builder.finish();
    text.with_metadata(TextMetadata {
        language: output.language,
        confidence: (kept > 0).then(|| confidence_sum / kept as f32),
        ..TextMetadata::default()
    })
}

/// Runs an [`OcrEngine`] over image sources
#[derive(Clone)]
pub struct OcrExtractor {
    engine: Arc<dyn OcrEngine>,
    config: OcrConfig,
}

impl OcrExtractor {
    pub fn new(engine: Arc<dyn OcrEngine>, config: OcrConfig) -> Self {
        Self { engine, config }
    }

    pub fn engine(&self) -> Arc<dyn OcrEngine> {
        self.engine.clone()
    }

    pub async fn extract_with(&self, source: OcrSource, config: &OcrConfig) -> TextDetectionResult {
        let image = match source {
            OcrSource::Image(image) => image,
            OcrSource::Uri(uri) => {
                return TextDetectionResult::error(format!(
                    "OCR from URI {uri} needs decoding that is not wired in"
                ));
            }
            OcrSource::FilePath(path) => {
                return TextDetectionResult::error(format!(
                    "OCR from file {} needs decoding that is not wired in",
                    path.display()
                ));
            }
            OcrSource::Screenshot => {
                return TextDetectionResult::error(
                    "OCR from screenshot needs a screen capturer; use continuous OCR",
                );
            }
        };

        recognize_image(self.engine.as_ref(), &image, config, SourceType::Ocr).await
    }
}

/// Shared by one-shot and continuous OCR
pub(crate) async fn recognize_image(
    engine: &dyn OcrEngine,
    image: &ImageData,
    config: &OcrConfig,
    source_type: SourceType,
) -> TextDetectionResult {
    if image.is_empty() {
        return TextDetectionResult::error("image has no pixels");
    }

    let started = Instant::now();
    match engine.recognize(image, &config.language).await {
        Ok(output) => {
            let mut text = assemble(output, config.min_confidence, source_type);
            text.metadata.capture_duration = Some(started.elapsed());
            tracing::debug!(
                "[OCR] {} recognised {} words in {:?}",
                engine.name(),
                text.tokens.len(),
                started.elapsed()
            );
            TextDetectionResult::from_text(text)
        }
        Err(e) => {
            tracing::error!("[OCR] {} failed: {}", engine.name(), e);
            TextDetectionResult::error_with("OCR recognition failed", e)
        }
    }
}

#[async_trait]
impl TextExtractor for OcrExtractor {
    type Input = OcrSource;

    fn source_type(&self) -> SourceType {
        SourceType::Ocr
    }

    async fn extract(&self, input: Self::Input) -> TextDetectionResult {
        self.extract_with(input, &self.config).await
    }
}

#[cfg(test)]
mod tests {
    use utext_types::{ImageFormat, TextSpan};

    use super::*;

    fn word(text: &str, line: usize, confidence: f32) -> OcrWord {
        OcrWord {
            text: text.into(),
            bounding_box: BoundingBox::new(0.0, line as f32 * 20.0, 40.0, line as f32 * 20.0 + 15.0),
            confidence,
            line,
        }
    }

    struct FixedEngine(Result<Vec<OcrWord>, String>);

    #[async_trait]
    impl OcrEngine for FixedEngine {
        async fn recognize(&self, _image: &ImageData, _language: &str) -> Result<OcrOutput, OcrError> {
            match &self.0 {
                Ok(words) => Ok(OcrOutput {
                    words: words.clone(),
                    language: Some("en".into()),
                }),
                Err(message) => Err(OcrError::Engine(message.clone())),
            }
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn image() -> ImageData {
        ImageData {
            data: vec![0; 16],
            width: 2,
            height: 2,
            format: ImageFormat::Rgba8,
        }
    }

    #[test]
    fn test_assemble_groups_lines_and_filters_confidence() {
        let output = OcrOutput {
            words: vec![
                word("second", 1, 0.9),
                word("first", 0, 0.8),
                word("noise", 0, 0.1),
                word("line", 0, 1.0),
            ],
            language: None,
        };
        let text = assemble(output, 0.5, SourceType::Ocr);
        assert_eq!(text.raw_text, "first line\nsecond");
        assert_eq!(text.tokens[2].span, TextSpan::new(11, 17));
        assert!(text.validate().is_ok());
        assert!((text.metadata.confidence.unwrap() - 0.9).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_image_source_is_recognised() {
        let extractor = OcrExtractor::new(
            Arc::new(FixedEngine(Ok(vec![word("Hi", 0, 0.9)]))),
            OcrConfig::default(),
        );
        let result = extractor.extract(OcrSource::Image(image())).await;
        let text = result.into_text().expect("success");
        assert_eq!(text.raw_text, "Hi");
        assert_eq!(text.source_type, SourceType::Ocr);
        assert_eq!(text.metadata.language.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_no_words_is_empty() {
        let extractor = OcrExtractor::new(Arc::new(FixedEngine(Ok(vec![]))), OcrConfig::default());
        assert!(extractor.extract(OcrSource::Image(image())).await.is_empty());
    }

    #[tokio::test]
    async fn test_engine_failure_is_error() {
        let extractor = OcrExtractor::new(
            Arc::new(FixedEngine(Err("model missing".into()))),
            OcrConfig::default(),
        );
        assert!(extractor.extract(OcrSource::Image(image())).await.is_error());
    }

    #[tokio::test]
    async fn test_unwired_sources_are_explicit_errors() {
        let extractor = OcrExtractor::new(
            Arc::new(FixedEngine(Ok(vec![word("x", 0, 1.0)]))),
            OcrConfig::default(),
        );
        for source in [
            OcrSource::Uri("content://media/1".into()),
            OcrSource::FilePath("/tmp/page.png".into()),
            OcrSource::Screenshot,
        ] {
            assert!(extractor.extract(source).await.is_error());
        }
    }

    #[tokio::test]
    async fn test_empty_image_is_error() {
        let extractor = OcrExtractor::new(Arc::new(FixedEngine(Ok(vec![]))), OcrConfig::default());
        let blank = ImageData {
            data: vec![],
            width: 0,
            height: 0,
            format: ImageFormat::Png,
        };
        assert!(extractor.extract(OcrSource::Image(blank)).await.is_error());
    }
}
