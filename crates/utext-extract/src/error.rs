#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("node is no longer attached to the window")]
    Detached,

    #[error("node access failed: {0}")]
    Access(String),
}

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR engine error: {0}")]
    Engine(String),

    #[error("unsupported image: {0}")]
    UnsupportedImage(String),

    #[error("language not available: {0}")]
    LanguageUnavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("no display available")]
    NoDisplay,

    #[error("capture failed: {0}")]
    Failed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("response exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}
