use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tokio::time::timeout;
use utext_config::Config;
use utext_config::web::WebConfig;
use utext_extract::{
    BackendOcr, CaptureError, FetchError, OcrEngine, OcrError, OcrOutput, OcrWord,
    ScreenCapturer, SourceExtractor, WebFetcher, WebPage,
};
use utext_types::{
    BoundingBox, DetectionContext, ImageData, ImageFormat, SourceType, TextDetectionResult,
    TextSpan, UiNode,
};

struct WordsEngine {
    words: Vec<&'static str>,
    calls: AtomicUsize,
}

impl WordsEngine {
    fn new(words: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            words,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl OcrEngine for WordsEngine {
    async fn recognize(&self, _image: &ImageData, _language: &str) -> Result<OcrOutput, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(OcrOutput {
            words: self
                .words
                .iter()
                .enumerate()
                .map(|(i, w)| OcrWord {
                    text: w.to_string(),
                    bounding_box: BoundingBox::new(i as f32 * 50.0, 0.0, i as f32 * 50.0 + 40.0, 20.0),
                    confidence: 0.9,
                    line: 0,
                })
                .collect(),
            language: None,
        })
    }

    fn name(&self) -> &str {
        "words"
    }
}

struct PageFetcher {
    calls: AtomicUsize,
}

#[async_trait]
impl WebFetcher for PageFetcher {
    async fn fetch(&self, url: &Url, _config: &WebConfig) -> Result<WebPage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(WebPage {
            url: url.to_string(),
            title: Some("Story".into()),
            language: None,
            text: "Article body".into(),
        })
    }
}

struct StillCapturer;

#[async_trait]
impl ScreenCapturer for StillCapturer {
    async fn capture(&self) -> Result<ImageData, CaptureError> {
        Ok(bitmap())
    }
}

struct UriOcr;

#[async_trait]
impl BackendOcr for UriOcr {
    async fn recognize_uri(&self, uri: &str, _language: &str) -> Result<OcrOutput, OcrError> {
        if uri.starts_with("content://") {
            Ok(OcrOutput {
                words: vec![OcrWord {
                    text: "scanned".into(),
                    bounding_box: None,
                    confidence: 1.0,
                    line: 0,
                }],
                language: None,
            })
        } else {
            Err(OcrError::UnsupportedImage(uri.into()))
        }
    }
}

fn bitmap() -> ImageData {
    ImageData {
        data: vec![1; 4],
        width: 1,
        height: 1,
        format: ImageFormat::Rgba8,
    }
}

fn tree() -> UiNode {
    UiNode::container(vec![
        UiNode::with_text("Hello world", BoundingBox::new(0.0, 0.0, 100.0, 20.0)),
    ])
}

fn fetcher() -> Arc<PageFetcher> {
    Arc::new(PageFetcher {
        calls: AtomicUsize::new(0),
    })
}

#[tokio::test]
async fn test_accessibility_wins_and_offsets_match() {
    let engine = WordsEngine::new(vec!["ocr"]);
    let extractor = SourceExtractor::new(engine.clone(), fetcher());
    let context = DetectionContext {
        accessibility: Some(tree()),
        bitmap: Some(bitmap()),
        ..DetectionContext::default()
    };

    let text = extractor
        .extract_auto(&context, &Config::default())
        .await
        .into_text()
        .expect("accessibility text");

    assert_eq!(text.source_type, SourceType::Accessibility);
    assert_eq!(text.raw_text, "Hello world");
    assert_eq!(text.tokens[0].span, TextSpan::new(0, 5));
    assert_eq!(text.tokens[1].span, TextSpan::new(6, 11));
    assert_eq!(engine.calls.load(Ordering::SeqCst), 0, "OCR must not run");
}

#[tokio::test]
async fn test_empty_tree_falls_back_to_bitmap() {
    let extractor = SourceExtractor::new(WordsEngine::new(vec!["from", "pixels"]), fetcher());
    let context = DetectionContext {
        accessibility: Some(UiNode::container(vec![])),
        bitmap: Some(bitmap()),
        ..DetectionContext::default()
    };

    let text = extractor
        .extract_auto(&context, &Config::default())
        .await
        .into_text()
        .expect("ocr text");
    assert_eq!(text.source_type, SourceType::Ocr);
    assert_eq!(text.raw_text, "from pixels");
}

#[tokio::test]
async fn test_continuous_used_when_requested() {
    let extractor = SourceExtractor::new(WordsEngine::new(vec!["live"]), fetcher())
        .with_capturer(Arc::new(StillCapturer));
    let context = DetectionContext {
        continuous: true,
        ..DetectionContext::default()
    };

    let result = timeout(
        Duration::from_secs(5),
        extractor.extract_auto(&context, &Config::default()),
    )
    .await
    .expect("timed out");
    let text = result.into_text().expect("continuous text");
    assert_eq!(text.source_type, SourceType::ContinuousOcr);
}

#[tokio::test]
async fn test_http_url_goes_to_web() {
    let fetcher = fetcher();
    let extractor = SourceExtractor::new(WordsEngine::new(vec![]), fetcher.clone());
    let context = DetectionContext {
        url: Some("https://example.com/a".into()),
        ..DetectionContext::default()
    };

    let text = extractor
        .extract_auto(&context, &Config::default())
        .await
        .into_text()
        .expect("web text");
    assert_eq!(text.source_type, SourceType::Web);
    assert_eq!(text.metadata.title.as_deref(), Some("Story"));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_content_uri_goes_to_backend_ocr() {
    let fetcher = fetcher();
    let extractor = SourceExtractor::new(WordsEngine::new(vec![]), fetcher.clone())
        .with_backend_ocr(Arc::new(UriOcr));
    let context = DetectionContext {
        url: Some("content://media/external/images/7".into()),
        ..DetectionContext::default()
    };

    let text = extractor
        .extract_auto(&context, &Config::default())
        .await
        .into_text()
        .expect("backend text");
    assert_eq!(text.raw_text, "scanned");
    assert_eq!(text.source_type, SourceType::Ocr);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_nothing_available_is_empty() {
    let extractor = SourceExtractor::new(WordsEngine::new(vec![]), fetcher());
    let result = extractor
        .extract_auto(&DetectionContext::default(), &Config::default())
        .await;
    assert!(matches!(result, TextDetectionResult::Empty));
}

#[tokio::test]
async fn test_continuous_without_capturer_errors_once() {
    let extractor = SourceExtractor::new(WordsEngine::new(vec!["x"]), fetcher());
    let mut stream = extractor.start_continuous_ocr(Duration::from_millis(10), &Config::default().ocr);
    assert!(stream.next().await.unwrap().is_error());
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_missing_accessibility_root_is_error() {
    let extractor = SourceExtractor::new(WordsEngine::new(vec![]), fetcher());
    assert!(extractor.extract_from_accessibility(None).is_error());
}
