mod accessibility;
mod capture;
mod continuous;
mod error;
mod extractor;
mod html;
mod ocr;
mod web;

pub use accessibility::{AccessibilityExtractor, AccessibilityNode};
pub use capture::ScreenCapturer;
pub use continuous::ContinuousOcr;
pub use error::{CaptureError, FetchError, NodeError, OcrError};
pub use extractor::{SourceExtractor, TextExtractor};
pub use html::{HtmlDocument, html_to_document};
pub use ocr::{BackendOcr, OcrEngine, OcrExtractor, OcrOutput, OcrSource, OcrWord, assemble};
pub use web::{HttpFetcher, WebExtractor, WebFetcher, WebPage, parse_web_url};
