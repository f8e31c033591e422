use crate::geometry::{BoundingBox, TextSpan};
use crate::text::{SourceType, Token, UniversalText};

/// Assembles raw text word by word while recording each token's exact span.
///
/// Words on one line are joined with a single space, lines with `\n`.
pub struct TextBuilder {
    raw: String,
    tokens: Vec<Token>,
    source_type: SourceType,
    line_has_content: bool,
}

impl TextBuilder {
    pub fn new(source_type: SourceType) -> Self {
        Self {
            raw: String::new(),
            tokens: Vec::new(),
            source_type,
            line_has_content: false,
        }
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Append one word and return its span. Blank words are ignored.
    pub fn push_word(
        &mut self,
        word: &str,
        bounding_box: Option<BoundingBox>,
        confidence: f32,
    ) -> Option<TextSpan> {
        let word = word.trim();
        if word.is_empty() {
            return None;
        }
        if self.line_has_content {
            self.raw.push(' ');
        }
        let start = self.raw.len();
        self.raw.push_str(word);
        let span = TextSpan::new(start, self.raw.len());
        self.line_has_content = true;

        let token = Token::new(word, self.tokens.len(), self.source_type)
            .with_bounding_box(bounding_box)
            .with_confidence(confidence)
            .with_span(span);
        self.tokens.push(token);
        span
    }

    /// Close the current line. Consecutive calls do not stack blank lines.
    pub fn end_line(&mut self) {
        if self.line_has_content {
            self.raw.push('\n');
            self.line_has_content = false;
        }
    }

    pub fn finish(mut self) -> UniversalText {
        if self.raw.ends_with('\n') {
            self.raw.pop();
        }
        UniversalText::new(self.raw, self.tokens, self.source_type)
    }
}
