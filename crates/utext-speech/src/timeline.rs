use std::ops::Range;

use utext_types::{TextSpan, Token, UniversalText};

const SENTENCE_END: [char; 7] = ['.', '!', '?', '…', '。', '！', '？'];

#[derive(Debug, Clone)]
struct Entry {
    span: TextSpan,
    token: Token,
    sentence: usize,
}

/// Tokens of one text laid out by byte offset, for resolving engine ranges
#[derive(Debug, Clone, Default)]
pub(crate) struct Timeline {
    entries: Vec<Entry>,
    sentences: Vec<Range<usize>>,
}

impl Timeline {
    /// A token keeps its own span when that span spells it in `raw_text`.
    /// Otherwise it is placed at a running cursor that assumes one separator
    /// between tokens.
    pub(crate) fn new(text: &UniversalText) -> Self {
        let raw = text.raw_text.as_str();
        let mut cursor = 0;
        let mut entries = Vec::with_capacity(text.tokens.len());

        for token in text.tokens.iter().filter(|t| !t.is_empty()) {
            let own = token
                .span
                .filter(|span| raw.get(span.start..span.end) == Some(token.text.as_str()));
            let Some(span) = own.or_else(|| TextSpan::new(cursor, cursor + token.len())) else {
                continue;
            };
            cursor = span.end + 1;
            entries.push(Entry {
                span,
                token: token.clone(),
                sentence: 0,
            });
        }
        entries.sort_by_key(|e| e.span.start);

        let mut sentences = Vec::new();
        let mut first = 0;
        let count = entries.len();
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.sentence = sentences.len();
            if entry.token.text.ends_with(SENTENCE_END) || i + 1 == count {
                sentences.push(first..i + 1);
                first = i + 1;
            }
        }

        Self { entries, sentences }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry overlapping `start..end`, or holding `start` when the range is empty
    pub(crate) fn locate(&self, start: usize, end: usize) -> Option<usize> {
        let i = self.entries.partition_point(|e| e.span.end <= start);
        let entry = self.entries.get(i)?;
        let hit = if end > start {
            entry.span.start < end
        } else {
            entry.span.contains(start)
        };
        hit.then_some(i)
    }

    /// Share of the token covered by `start..end`, in `(0, 1]`
    pub(crate) fn progress(&self, index: usize, start: usize, end: usize) -> f32 {
        let Some(entry) = self.entries.get(index) else {
            return 1.0;
        };
        let ratio = end.saturating_sub(start) as f32 / entry.token.len() as f32;
        ratio.clamp(f32::MIN_POSITIVE, 1.0)
    }

    pub(crate) fn token(&self, index: usize) -> Option<&Token> {
        self.entries.get(index).map(|e| &e.token)
    }

    pub(crate) fn span(&self, index: usize) -> Option<TextSpan> {
        self.entries.get(index).map(|e| e.span)
    }

    pub(crate) fn sentence_of(&self, index: usize) -> Option<usize> {
        self.entries.get(index).map(|e| e.sentence)
    }

    pub(crate) fn sentence_tokens(&self, sentence: usize) -> Vec<Token> {
        self.sentences
            .get(sentence)
            .map(|range| {
                self.entries[range.clone()]
                    .iter()
                    .map(|e| e.token.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}
