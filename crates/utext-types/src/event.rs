use crate::text::Token;

/// Playback progress delivered to the UI
#[derive(Debug, Clone, PartialEq)]
pub enum HighlightEvent {
    /// `progress` is in `(0.0, 1.0]`
    TokenHighlight { token: Token, progress: f32 },
    SentenceHighlight(Vec<Token>),
    Started,
    Paused,
    Resumed,
    Completed,
    Error(String),
}

impl HighlightEvent {
    /// Completed and Error end a highlight stream
    pub fn is_terminal(&self) -> bool {
        matches!(self, HighlightEvent::Completed | HighlightEvent::Error(_))
    }
}
