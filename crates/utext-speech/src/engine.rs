use std::sync::Arc;

use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("speech engine is not available")]
    Unavailable,

    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f32 },

    #[error("speech engine rejected the utterance: {0}")]
    Rejected(String),
}

/// Lifecycle and progress callbacks for one utterance.
///
/// Engines may call these from any thread, including from inside
/// [`SpeechEngine::speak`].
pub trait UtteranceListener: Send + Sync {
    fn on_start(&self, utterance_id: Uuid);

    fn on_done(&self, utterance_id: Uuid);

    fn on_error(&self, utterance_id: Uuid, message: &str);

    /// The engine is about to speak bytes `start..end` of the utterance text
    fn on_range_start(&self, utterance_id: Uuid, start: usize, end: usize);
}

/// Text-to-speech backend
pub trait SpeechEngine: Send + Sync {
    /// 1.0 is normal speed
    fn set_rate(&self, rate: f32) -> Result<(), SpeechError>;

    /// 1.0 is normal pitch
    fn set_pitch(&self, pitch: f32) -> Result<(), SpeechError>;

    /// Queue `text`, flushing anything still playing
    fn speak(&self, text: &str, utterance_id: Uuid) -> Result<(), SpeechError>;

    /// Silence output. Callbacks for the interrupted utterance may still arrive.
    fn stop(&self);

    fn set_listener(&self, listener: Arc<dyn UtteranceListener>);
}
