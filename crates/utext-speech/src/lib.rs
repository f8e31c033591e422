mod engine;
mod synchronizer;
mod timeline;

pub use engine::{SpeechEngine, SpeechError, UtteranceListener};
pub use synchronizer::{HighlightStream, PlaybackSynchronizer};
pub use uuid::Uuid;
