use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use utext_speech::{SpeechEngine, SpeechError, UtteranceListener, Uuid};

/// Speech engine that "speaks" one word per tick and reports word ranges.
/// Stands in for a platform TTS voice on the command line.
pub struct PacedEngine {
    word_duration: Duration,
    rate: Mutex<f32>,
    listener: Mutex<Option<Arc<dyn UtteranceListener>>>,
    current: Mutex<Option<CancellationToken>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PacedEngine {
    pub fn new(word_duration: Duration) -> Self {
        Self {
            word_duration,
            rate: Mutex::new(1.0),
            listener: Mutex::new(None),
            current: Mutex::new(None),
        }
    }
}

impl SpeechEngine for PacedEngine {
    fn set_rate(&self, rate: f32) -> Result<(), SpeechError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(SpeechError::InvalidParameter {
                name: "rate",
                value: rate,
            });
        }
        *lock(&self.rate) = rate;
        Ok(())
    }

    fn set_pitch(&self, _pitch: f32) -> Result<(), SpeechError> {
        Ok(())
    }

    fn speak(&self, text: &str, utterance_id: Uuid) -> Result<(), SpeechError> {
        let listener = lock(&self.listener).clone().ok_or(SpeechError::Unavailable)?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SpeechError::Rejected(e.to_string()))?;

        let cancel = CancellationToken::new();
        if let Some(previous) = lock(&self.current).replace(cancel.clone()) {
            previous.cancel();
        }

        let delay = self.word_duration.div_f32(*lock(&self.rate));
        let words = word_ranges(text);
        tracing::debug!("[PACED] {} words every {:?}", words.len(), delay);

        runtime.spawn(async move {
            listener.on_start(utterance_id);
            for (start, end) in words {
                if cancel.is_cancelled() {
                    return;
                }
                listener.on_range_start(utterance_id, start, end);
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            listener.on_done(utterance_id);
        });
        Ok(())
    }

    fn stop(&self) {
        if let Some(current) = lock(&self.current).take() {
            current.cancel();
        }
    }

    fn set_listener(&self, listener: Arc<dyn UtteranceListener>) {
        *lock(&self.listener) = Some(listener);
    }
}

/// Byte ranges of whitespace-separated words
fn word_ranges(text: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                ranges.push((s, i));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        ranges.push((s, text.len()));
    }
    ranges
}
