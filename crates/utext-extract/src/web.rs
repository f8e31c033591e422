use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use utext_config::web::WebConfig;
use utext_types::{SourceType, TextBuilder, TextDetectionResult, TextMetadata};

use crate::error::FetchError;
use crate::extractor::TextExtractor;
use crate::html::html_to_document;

/// Fetched page reduced to readable text
#[derive(Debug, Clone, PartialEq)]
pub struct WebPage {
    pub url: String,
    pub title: Option<String>,
    pub language: Option<String>,
    /// One block per line
    pub text: String,
}

/// Page fetch + parse provider interface
#[async_trait]
pub trait WebFetcher: Send + Sync {
    async fn fetch(&self, url: &Url, config: &WebConfig) -> Result<WebPage, FetchError>;
}

/// Plain HTTP GET with HTML-to-text conversion
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl WebFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, config: &WebConfig) -> Result<WebPage, FetchError> {
        let mut response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, &config.user_agent)
            .timeout(config.timeout())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }
        if response
            .content_length()
            .is_some_and(|len| len > config.max_body_bytes as u64)
        {
            return Err(FetchError::TooLarge {
                limit: config.max_body_bytes,
            });
        }

        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_none_or(|ct| ct.contains("html"));
        let final_url = response.url().to_string();

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > config.max_body_bytes {
                tracing::warn!("[WEB] {} exceeds {} bytes, aborting", final_url, config.max_body_bytes);
                return Err(FetchError::TooLarge {
                    limit: config.max_body_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }
        let body = String::from_utf8_lossy(&body);

        if is_html {
            let doc = html_to_document(&body);
            Ok(WebPage {
                url: final_url,
                title: doc.title,
                language: doc.language,
                text: doc.text,
            })
        } else {
            Ok(WebPage {
                url: final_url,
                title: None,
                language: None,
                text: body.into_owned(),
            })
        }
    }
}

/// Accepts only http and https URLs
pub fn parse_web_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::UnsupportedScheme(other.to_string())),
    }
}

#[derive(Clone)]
pub struct WebExtractor {
    fetcher: Arc<dyn WebFetcher>,
    config: WebConfig,
}

impl WebExtractor {
    pub fn new(fetcher: Arc<dyn WebFetcher>, config: WebConfig) -> Self {
        Self { fetcher, config }
    }

    pub async fn extract_with(&self, url: &str, config: &WebConfig) -> TextDetectionResult {
        let url = match parse_web_url(url) {
            Ok(url) => url,
            Err(e) => return TextDetectionResult::error_with("cannot fetch this URL", e),
        };

        let started = Instant::now();
        let page = match self.fetcher.fetch(&url, config).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("[WEB] Fetch of {} failed: {}", url, e);
                return TextDetectionResult::error_with(format!("failed to fetch {url}"), e);
            }
        };

        let mut builder = TextBuilder::new(SourceType::Web);
        for line in page.text.lines() {
            for word in line.split_whitespace() {
                builder.push_word(word, None, 1.0);
            }
            builder.end_line();
        }
        let text = builder.finish().with_metadata(TextMetadata {
            title: page.title,
            url: Some(page.url),
            language: page.language,
            confidence: Some(1.0),
            capture_duration: Some(started.elapsed()),
            page: None,
        });

        tracing::debug!("[WEB] {} gave {} tokens", url, text.tokens.len());
        TextDetectionResult::from_text(text)
    }
}

#[async_trait]
impl TextExtractor for WebExtractor {
    type Input = String;

    fn source_type(&self) -> SourceType {
        SourceType::Web
    }

    async fn extract(&self, input: Self::Input) -> TextDetectionResult {
        self.extract_with(&input, &self.config).await
    }
}
