use std::sync::Arc;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use tokio_util::sync::CancellationToken;
use utext_config::ocr::OcrConfig;
use utext_types::{SourceType, TextDetectionResult};

use crate::capture::ScreenCapturer;
use crate::ocr::{OcrEngine, recognize_image};

/// Lazy stream of capture+OCR results.
///
/// One result per cycle, cycles separated by the interval. The stream ends
/// on cancellation, when the handle is dropped, or right after the first
/// `Error`. It cannot be restarted; start a new one instead.
pub struct ContinuousOcr {
    rx: AsyncReceiver<TextDetectionResult>,
    cancel: CancellationToken,
    finished: bool,
}

impl ContinuousOcr {
    pub(crate) fn spawn(
        capturer: Arc<dyn ScreenCapturer>,
        engine: Arc<dyn OcrEngine>,
        interval: Duration,
        config: OcrConfig,
    ) -> Self {
        let (tx, rx) = kanal::bounded_async(1);
        let cancel = CancellationToken::new();
        tokio::spawn(capture_loop(
            capturer,
            engine,
            interval,
            config,
            tx,
            cancel.child_token(),
        ));
        Self {
            rx,
            cancel,
            finished: false,
        }
    }

    /// A stream that yields a single error, for when capture is not possible at all
    pub(crate) fn failed(message: &str) -> Self {
        let (tx, rx) = kanal::bounded_async(1);
        let _ = tx.try_send(TextDetectionResult::error(message));
        Self {
            rx,
            cancel: CancellationToken::new(),
            finished: false,
        }
    }

    /// Next result, or `None` once the stream has ended.
    ///
    /// After [`cancel`](Self::cancel) this returns `None` immediately, even
    /// if a result was already buffered.
    pub async fn next(&mut self) -> Option<TextDetectionResult> {
        if self.finished {
            return None;
        }
        let item = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            received = self.rx.recv() => received.ok(),
        };
        match &item {
            None => self.finished = true,
            Some(result) if result.is_error() => self.finished = true,
            Some(_) => {}
        }
        item
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token that stops this stream when cancelled from elsewhere
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for ContinuousOcr {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn capture_loop(
    capturer: Arc<dyn ScreenCapturer>,
    engine: Arc<dyn OcrEngine>,
    interval: Duration,
    config: OcrConfig,
    tx: AsyncSender<TextDetectionResult>,
    cancel: CancellationToken,
) {
    tracing::info!("[CONTINUOUS] Starting capture loop every {:?}", interval);
    let mut cycles = 0u64;

    loop {
        let cycle = async {
            match capturer.capture().await {
                Ok(image) => {
                    recognize_image(engine.as_ref(), &image, &config, SourceType::ContinuousOcr)
                        .await
                }
                Err(e) => {
                    tracing::error!("[CONTINUOUS] Capture failed: {}", e);
                    TextDetectionResult::error_with("screen capture failed", e)
                }
            }
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = cycle => result,
        };
        cycles += 1;

        let stop_after = result.is_error();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            sent = tx.send(result) => {
                if sent.is_err() {
                    break;
                }
            }
        }
        if stop_after {
            tracing::warn!("[CONTINUOUS] Stopping after error on cycle {}", cycles);
            break;
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    tracing::info!("[CONTINUOUS] Capture loop stopped after {} cycles", cycles);
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::time::timeout;
    use utext_types::{ImageData, ImageFormat};

    use super::*;
    use crate::error::{CaptureError, OcrError};
    use crate::ocr::{OcrOutput, OcrWord};

    struct CountingCapturer {
        calls: AtomicUsize,
        fail_on: Option<usize>,
    }

    impl CountingCapturer {
        fn new(fail_on: Option<usize>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on,
            }
        }
    }

    #[async_trait]
    impl ScreenCapturer for CountingCapturer {
        async fn capture(&self) -> Result<ImageData, CaptureError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if Some(call) == self.fail_on {
                return Err(CaptureError::Failed("display asleep".into()));
            }
            Ok(ImageData {
                data: vec![255; 4],
                width: 1,
                height: 1,
                format: ImageFormat::Rgba8,
            })
        }
    }

    struct EchoEngine;

    #[async_trait]
    impl OcrEngine for EchoEngine {
        async fn recognize(&self, _image: &ImageData, _language: &str) -> Result<OcrOutput, OcrError> {
            Ok(OcrOutput {
                words: vec![OcrWord {
                    text: "frame".into(),
                    bounding_box: None,
                    confidence: 1.0,
                    line: 0,
                }],
                language: None,
            })
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_emits_one_result_per_cycle() {
        let mut stream = ContinuousOcr::spawn(
            Arc::new(CountingCapturer::new(None)),
            Arc::new(EchoEngine),
            Duration::from_millis(10),
            OcrConfig::default(),
        );

        for _ in 0..3 {
            let result = timeout(Duration::from_secs(2), stream.next())
                .await
                .expect("timed out")
                .expect("stream ended early");
            let text = result.into_text().expect("success");
            assert_eq!(text.raw_text, "frame");
            assert_eq!(text.source_type, SourceType::ContinuousOcr);
        }
    }

    #[tokio::test]
    async fn test_single_error_then_end() {
        let capturer = Arc::new(CountingCapturer::new(Some(1)));
        let mut stream = ContinuousOcr::spawn(
            capturer.clone(),
            Arc::new(EchoEngine),
            Duration::from_millis(5),
            OcrConfig::default(),
        );

        let first = timeout(Duration::from_secs(2), stream.next()).await.unwrap();
        assert!(first.unwrap().is_success());
        let second = timeout(Duration::from_secs(2), stream.next()).await.unwrap();
        assert!(second.unwrap().is_error());
        let third = timeout(Duration::from_secs(2), stream.next()).await.unwrap();
        assert!(third.is_none());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(capturer.calls.load(Ordering::SeqCst), 2, "no retry after error");
    }

    #[tokio::test]
    async fn test_cancel_mid_interval_stops_emissions() {
        let capturer = Arc::new(CountingCapturer::new(None));
        let mut stream = ContinuousOcr::spawn(
            capturer.clone(),
            Arc::new(EchoEngine),
            Duration::from_millis(200),
            OcrConfig::default(),
        );

        assert!(stream.next().await.unwrap().is_success());
        stream.cancel();
        assert!(stream.next().await.is_none());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(stream.next().await.is_none());
        assert_eq!(capturer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropping_the_handle_stops_the_loop() {
        let capturer = Arc::new(CountingCapturer::new(None));
        let stream = ContinuousOcr::spawn(
            capturer.clone(),
            Arc::new(EchoEngine),
            Duration::from_millis(20),
            OcrConfig::default(),
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
        drop(stream);

        tokio::time::sleep(Duration::from_millis(30)).await;
        let settled = capturer.calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(capturer.calls.load(Ordering::SeqCst), settled);
    }

    #[tokio::test]
    async fn test_cancel_releases_loop_blocked_on_full_channel() {
        let capturer = Arc::new(CountingCapturer::new(None));
        let engine = Arc::new(EchoEngine);
        let stream = ContinuousOcr::spawn(
            capturer.clone(),
            engine.clone(),
            Duration::from_millis(1),
            OcrConfig::default(),
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        stream.cancel();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(Arc::strong_count(&capturer), 1, "capture loop still running");
        assert_eq!(Arc::strong_count(&engine), 1);
        assert!(stream.is_cancelled());
        drop(stream);
    }

    #[tokio::test]
    async fn test_external_token_cancels_stream() {
        let mut stream = ContinuousOcr::spawn(
            Arc::new(CountingCapturer::new(None)),
            Arc::new(EchoEngine),
            Duration::from_millis(100),
            OcrConfig::default(),
        );
        let token = stream.cancellation_token();
        assert!(stream.next().await.unwrap().is_success());
        token.cancel();
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_failed_stream_yields_one_error() {
        let mut stream = ContinuousOcr::failed("no capturer");
        assert!(stream.next().await.unwrap().is_error());
        assert!(stream.next().await.is_none());
    }
}
