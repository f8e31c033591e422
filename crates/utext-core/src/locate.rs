use utext_types::TextSpan;

/// Finds successive segments of a text, never matching before the last hit.
///
/// Repeated identical segments therefore resolve to successive occurrences.
pub(crate) struct SpanLocator<'a> {
    haystack: &'a str,
    cursor: usize,
}

impl<'a> SpanLocator<'a> {
    pub fn new(haystack: &'a str) -> Self {
        Self {
            haystack,
            cursor: 0,
        }
    }

    /// Next occurrence of `needle` at or after the cursor. The cursor only
    /// moves on success.
    pub fn locate(&mut self, needle: &str) -> Option<TextSpan> {
        let rest = self.haystack.get(self.cursor..)?;
        let found = rest.find(needle)?;
        let start = self.cursor + found;
        let span = TextSpan::new(start, start + needle.len())?;
        self.cursor = span.end;
        Some(span)
    }

    /// Move the cursor past an already known span
    pub fn skip_past(&mut self, span: TextSpan) {
        self.cursor = self.cursor.max(span.end);
    }
}
