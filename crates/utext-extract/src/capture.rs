use async_trait::async_trait;
use utext_types::ImageData;

use crate::error::CaptureError;

/// Source of screen frames for continuous OCR
#[async_trait]
pub trait ScreenCapturer: Send + Sync {
    /// Grab the current contents of the screen (or the watched region)
    async fn capture(&self) -> Result<ImageData, CaptureError>;
}
