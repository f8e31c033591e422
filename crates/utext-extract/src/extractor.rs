use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use utext_config::Config;
use utext_config::accessibility::AccessibilityConfig;
use utext_config::ocr::OcrConfig;
use utext_config::web::WebConfig;
use utext_types::{DetectionContext, SourceType, TextDetectionResult, UiNode};

use crate::accessibility::AccessibilityExtractor;
use crate::capture::ScreenCapturer;
use crate::continuous::ContinuousOcr;
use crate::ocr::{BackendOcr, OcrEngine, OcrExtractor, OcrSource, assemble};
use crate::web::{WebExtractor, WebFetcher};

/// Continuous emissions inspected by [`SourceExtractor::extract_auto`] before giving up
const AUTO_CONTINUOUS_ATTEMPTS: usize = 3;

const BACKEND_SCHEMES: [&str; 3] = ["content", "file", "android.resource"];

/// One source of text.
///
/// Implementations never fail across this boundary: problems are reported
/// as [`TextDetectionResult::Error`].
#[async_trait]
pub trait TextExtractor: Send + Sync {
    type Input: Send;

    fn source_type(&self) -> SourceType;

    async fn extract(&self, input: Self::Input) -> TextDetectionResult;
}

/// Facade over every text source
#[derive(Clone)]
pub struct SourceExtractor {
    accessibility: AccessibilityExtractor,
    ocr: OcrExtractor,
    web: WebExtractor,
    capturer: Option<Arc<dyn ScreenCapturer>>,
    backend_ocr: Option<Arc<dyn BackendOcr>>,
}

impl SourceExtractor {
    pub fn new(engine: Arc<dyn OcrEngine>, fetcher: Arc<dyn WebFetcher>) -> Self {
        Self {
            accessibility: AccessibilityExtractor::default(),
            ocr: OcrExtractor::new(engine, OcrConfig::default()),
            web: WebExtractor::new(fetcher, WebConfig::default()),
            capturer: None,
            backend_ocr: None,
        }
    }

    pub fn with_accessibility_limits(mut self, config: &AccessibilityConfig) -> Self {
        self.accessibility = AccessibilityExtractor::new(config);
        self
    }

    pub fn with_capturer(mut self, capturer: Arc<dyn ScreenCapturer>) -> Self {
        self.capturer = Some(capturer);
        self
    }

    pub fn with_backend_ocr(mut self, backend: Arc<dyn BackendOcr>) -> Self {
        self.backend_ocr = Some(backend);
        self
    }

    pub fn extract_from_accessibility(&self, root: Option<&UiNode>) -> TextDetectionResult {
        self.accessibility.walk(root)
    }

    pub async fn extract_from_ocr(&self, source: OcrSource, config: &OcrConfig) -> TextDetectionResult {
        self.ocr.extract_with(source, config).await
    }

    /// Must be called inside a tokio runtime
    pub fn start_continuous_ocr(&self, interval: Duration, config: &OcrConfig) -> ContinuousOcr {
        match &self.capturer {
            Some(capturer) => {
                ContinuousOcr::spawn(capturer.clone(), self.ocr.engine(), interval, config.clone())
            }
            None => {
                tracing::warn!("[EXTRACT] Continuous OCR requested without a screen capturer");
                ContinuousOcr::failed("no screen capturer configured")
            }
        }
    }

    pub async fn extract_from_web(&self, url: &str, config: &WebConfig) -> TextDetectionResult {
        self.web.extract_with(url, config).await
    }

    /// Tries each source in priority order and returns the first success.
    ///
    /// Order: accessibility tree, provided bitmap, continuous OCR (when
    /// requested), then the context URL. Returns `Empty` when nothing gave
    /// text.
    pub async fn extract_auto(&self, context: &DetectionContext, config: &Config) -> TextDetectionResult {
        if let Some(root) = &context.accessibility {
            let result = AccessibilityExtractor::new(&config.accessibility).walk(Some(root));
            if result.is_success() {
                tracing::info!("[AUTO] Using accessibility text");
                return result;
            }
            tracing::debug!("[AUTO] Accessibility gave no text, skipping");
        } else {
            tracing::debug!("[AUTO] No accessibility tree, skipping");
        }

        match &context.bitmap {
            Some(bitmap) if !bitmap.is_empty() => {
                let result = self
                    .extract_from_ocr(OcrSource::Image(bitmap.clone()), &config.ocr)
                    .await;
                if result.is_success() {
                    tracing::info!("[AUTO] Using OCR of provided bitmap");
                    return result;
                }
                tracing::debug!("[AUTO] Bitmap OCR gave no text, skipping");
            }
            Some(_) => tracing::debug!("[AUTO] Bitmap is empty, skipping"),
            None => tracing::debug!("[AUTO] No bitmap, skipping"),
        }

        if context.continuous {
            if let Some(result) = self.first_continuous_success(&config.ocr).await {
                tracing::info!("[AUTO] Using continuous OCR");
                return result;
            }
            tracing::debug!("[AUTO] Continuous OCR gave no text, skipping");
        } else {
            tracing::debug!("[AUTO] Continuous OCR not requested, skipping");
        }

        if let Some(url) = &context.url {
            let result = self.extract_from_url(url, config).await;
            if result.is_success() {
                tracing::info!("[AUTO] Using text from {}", url);
                return result;
            }
            tracing::debug!("[AUTO] URL {} gave no text", url);
        } else {
            tracing::debug!("[AUTO] No URL, skipping");
        }

        TextDetectionResult::Empty
    }

    async fn first_continuous_success(&self, config: &OcrConfig) -> Option<TextDetectionResult> {
        let mut stream = self.start_continuous_ocr(config.continuous_interval(), config);
        for _ in 0..AUTO_CONTINUOUS_ATTEMPTS {
            match stream.next().await {
                Some(result) if result.is_success() => return Some(result),
                Some(_) => continue,
                None => break,
            }
        }
        None
    }

    async fn extract_from_url(&self, url: &str, config: &Config) -> TextDetectionResult {
        let scheme = url
            .split_once(':')
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .unwrap_or_default();

        match scheme.as_str() {
            "http" | "https" => self.extract_from_web(url, &config.web).await,
            s if BACKEND_SCHEMES.contains(&s) => match &self.backend_ocr {
                Some(backend) => match backend.recognize_uri(url, &config.ocr.language).await {
                    Ok(output) => TextDetectionResult::from_text(assemble(
                        output,
                        config.ocr.min_confidence,
                        SourceType::Ocr,
                    )),
                    Err(e) => {
                        tracing::warn!("[AUTO] Backend OCR of {} failed: {}", url, e);
                        TextDetectionResult::error_with("backend OCR failed", e)
                    }
                },
                None => {
                    tracing::debug!("[AUTO] No backend OCR for {} URIs", s);
                    TextDetectionResult::Empty
                }
            },
            _ => {
                tracing::debug!("[AUTO] Unsupported URL {}", url);
                TextDetectionResult::Empty
            }
        }
    }
}
