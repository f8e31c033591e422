use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kanal::{AsyncReceiver, AsyncSender};
use utext_config::speech::SpeechConfig;
use utext_types::{HighlightEvent, UniversalText};
use uuid::Uuid;

use crate::engine::{SpeechEngine, SpeechError, UtteranceListener};
use crate::timeline::Timeline;

/// Highlight events of one playback session.
///
/// Ends after `Completed`, `Error`, a call to
/// [`PlaybackSynchronizer::stop`], or when a newer session replaces it.
/// Events already queued are still delivered.
pub struct HighlightStream {
    rx: AsyncReceiver<HighlightEvent>,
}

impl HighlightStream {
    pub async fn next(&mut self) -> Option<HighlightEvent> {
        self.rx.recv().await.ok()
    }

    /// Queued event, without waiting
    pub fn try_next(&mut self) -> Option<HighlightEvent> {
        self.rx.try_recv().ok().flatten()
    }
}

struct Session {
    timeline: Timeline,
    raw_text: String,
    /// Utterance whose callbacks are honoured; `None` while paused or finished
    utterance: Option<Uuid>,
    /// Offset in `raw_text` where the current utterance begins
    base: usize,
    token_index: usize,
    sentence: Option<usize>,
    highlight_sentences: bool,
    started: bool,
    paused: bool,
    tx: Option<AsyncSender<HighlightEvent>>,
}

impl Session {
    fn emit(&self, event: HighlightEvent) {
        if let Some(tx) = &self.tx {
            if tx.try_send(event).is_err() {
                tracing::debug!("[SPEECH] Highlight stream dropped by consumer");
            }
        }
    }

    fn close(&mut self) {
        self.utterance = None;
        self.tx = None;
    }

    fn is_current(&self, utterance_id: Uuid) -> bool {
        self.utterance == Some(utterance_id)
    }

    fn highlight(&mut self, start: usize, end: usize) {
        let (start, end) = (self.base + start, self.base + end);
        let Some(index) = self.timeline.locate(start, end) else {
            tracing::trace!("[SPEECH] Range {}..{} is between tokens", start, end);
            return;
        };
        self.token_index = index;

        if self.highlight_sentences {
            let sentence = self.timeline.sentence_of(index);
            if sentence.is_some() && sentence != self.sentence {
                self.sentence = sentence;
                let tokens = sentence
                    .map(|s| self.timeline.sentence_tokens(s))
                    .unwrap_or_default();
                self.emit(HighlightEvent::SentenceHighlight(tokens));
            }
        }

        if let Some(token) = self.timeline.token(index) {
            let progress = self.timeline.progress(index, start, end);
            self.emit(HighlightEvent::TokenHighlight {
                token: token.clone(),
                progress,
            });
        }
    }
}

type SharedSession = Arc<Mutex<Option<Session>>>;

fn lock(session: &Mutex<Option<Session>>) -> MutexGuard<'_, Option<Session>> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Routes engine callbacks to the active session
struct SessionListener {
    session: SharedSession,
}

impl SessionListener {
    fn with_current(&self, utterance_id: Uuid, f: impl FnOnce(&mut Session)) {
        let mut guard = lock(&self.session);
        match guard.as_mut() {
            Some(session) if session.is_current(utterance_id) => f(session),
            _ => tracing::trace!("[SPEECH] Ignoring callback for stale utterance {}", utterance_id),
        }
    }
}

impl UtteranceListener for SessionListener {
    fn on_start(&self, utterance_id: Uuid) {
        self.with_current(utterance_id, |session| {
            if !session.started {
                session.started = true;
                session.emit(HighlightEvent::Started);
            }
        });
    }

    fn on_done(&self, utterance_id: Uuid) {
        self.with_current(utterance_id, |session| {
            tracing::debug!("[SPEECH] Utterance {} completed", utterance_id);
            session.emit(HighlightEvent::Completed);
            session.close();
        });
    }

    fn on_error(&self, utterance_id: Uuid, message: &str) {
        self.with_current(utterance_id, |session| {
            tracing::error!("[SPEECH] Utterance {} failed: {}", utterance_id, message);
            session.emit(HighlightEvent::Error(message.to_string()));
            session.close();
        });
    }

    fn on_range_start(&self, utterance_id: Uuid, start: usize, end: usize) {
        self.with_current(utterance_id, |session| session.highlight(start, end));
    }
}

/// Drives a [`SpeechEngine`] and turns its progress callbacks into
/// [`HighlightEvent`]s for the token being spoken.
///
/// One session is active at a time; starting a new one ends the previous
/// stream.
pub struct PlaybackSynchronizer<E: SpeechEngine> {
    engine: E,
    session: SharedSession,
    config: SpeechConfig,
}

impl<E: SpeechEngine> PlaybackSynchronizer<E> {
    pub fn new(engine: E, config: SpeechConfig) -> Self {
        let session: SharedSession = Arc::new(Mutex::new(None));
        engine.set_listener(Arc::new(SessionListener {
            session: session.clone(),
        }));
        Self {
            engine,
            session,
            config,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Speak at the configured rate and pitch
    pub fn speak(&self, text: &UniversalText) -> HighlightStream {
        self.speak_with_highlight(text, self.config.rate, self.config.pitch)
    }

    pub fn speak_with_highlight(&self, text: &UniversalText, speed: f32, pitch: f32) -> HighlightStream {
        let (tx, rx) = kanal::unbounded_async();
        let stream = HighlightStream { rx };

        if lock(&self.session).take().is_some() {
            self.engine.stop();
        }

        if text.raw_text.trim().is_empty() {
            let _ = tx.try_send(HighlightEvent::Completed);
            return stream;
        }

        if let Err(e) = self.configure(speed, pitch) {
            tracing::error!("[SPEECH] Cannot configure engine: {}", e);
            let _ = tx.try_send(HighlightEvent::Error(e.to_string()));
            return stream;
        }

        let timeline = Timeline::new(text);
        if timeline.is_empty() {
            tracing::debug!("[SPEECH] Text has no tokens, nothing will be highlighted");
        }

        let utterance_id = Uuid::new_v4();
        *lock(&self.session) = Some(Session {
            timeline,
            raw_text: text.raw_text.clone(),
            utterance: Some(utterance_id),
            base: 0,
            token_index: 0,
            sentence: None,
            highlight_sentences: self.config.highlight_sentences,
            started: false,
            paused: false,
            tx: Some(tx),
        });

        tracing::info!(
            "[SPEECH] Speaking {} tokens as {} (rate {}, pitch {})",
            text.tokens.len(),
            utterance_id,
            speed,
            pitch
        );
        self.start_utterance(&text.raw_text, utterance_id);
        stream
    }

    /// Silence output and emit `Paused`. No-op unless speaking.
    pub fn pause(&self) {
        {
            let mut guard = lock(&self.session);
            let Some(session) = guard.as_mut().filter(|s| s.utterance.is_some()) else {
                return;
            };
            session.paused = true;
            session.utterance = None;
            session.emit(HighlightEvent::Paused);
        }
        self.engine.stop();
    }

    /// Restart speech from the last highlighted token and emit `Resumed`.
    /// No-op unless paused.
    pub fn resume(&self) {
        let (text, utterance_id) = {
            let mut guard = lock(&self.session);
            let Some(session) = guard.as_mut().filter(|s| s.paused) else {
                return;
            };

            let base = session
                .timeline
                .span(session.token_index)
                .map_or(0, |span| span.start);
            let base = if session.raw_text.is_char_boundary(base) { base } else { 0 };

            let utterance_id = Uuid::new_v4();
            session.paused = false;
            session.base = base;
            session.utterance = Some(utterance_id);
            session.emit(HighlightEvent::Resumed);
            tracing::debug!("[SPEECH] Resuming at byte {} as {}", base, utterance_id);
            (session.raw_text[base..].to_string(), utterance_id)
        };
        self.start_utterance(&text, utterance_id);
    }

    /// Silence output, reset the token position and end the stream
    pub fn stop(&self) {
        if let Some(session) = lock(&self.session).as_mut() {
            session.token_index = 0;
            session.sentence = None;
            session.paused = false;
            session.close();
        }
        self.engine.stop();
    }

    pub fn is_paused(&self) -> bool {
        lock(&self.session).as_ref().is_some_and(|s| s.paused)
    }

    pub fn is_speaking(&self) -> bool {
        lock(&self.session)
            .as_ref()
            .is_some_and(|s| s.utterance.is_some())
    }

    /// Index, in reading order, of the last highlighted token
    pub fn token_index(&self) -> usize {
        lock(&self.session).as_ref().map_or(0, |s| s.token_index)
    }

    fn configure(&self, speed: f32, pitch: f32) -> Result<(), SpeechError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(SpeechError::InvalidParameter {
                name: "rate",
                value: speed,
            });
        }
        if !pitch.is_finite() || pitch <= 0.0 {
            return Err(SpeechError::InvalidParameter {
                name: "pitch",
                value: pitch,
            });
        }
        self.engine.set_rate(speed)?;
        self.engine.set_pitch(pitch)
    }

    fn start_utterance(&self, text: &str, utterance_id: Uuid) {
        if let Err(e) = self.engine.speak(text, utterance_id) {
            tracing::error!("[SPEECH] Engine refused utterance {}: {}", utterance_id, e);
            let mut guard = lock(&self.session);
            if let Some(session) = guard.as_mut().filter(|s| s.is_current(utterance_id)) {
                session.emit(HighlightEvent::Error(e.to_string()));
                session.close();
            }
        }
    }
}
