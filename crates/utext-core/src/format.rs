use std::sync::LazyLock;

use regex::Regex;
use utext_types::{Token, UniversalText};

use crate::locate::SpanLocator;

static HORIZONTAL_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("valid regex"));
static SPACE_AROUND_NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" ?\n ?").expect("valid regex"));
static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Whitespace cleanup of the raw text alone
pub fn format_raw_text(raw: &str) -> String {
    let text = HORIZONTAL_SPACE.replace_all(raw, " ");
    let text = SPACE_AROUND_NEWLINE.replace_all(&text, "\n");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Collapse whitespace runs to one space, 3+ newlines to 2, and trim.
///
/// Token spans are recomputed against the new raw text so they stay valid;
/// a token whose text no longer appears verbatim (it contained a collapsed
/// whitespace run) loses its span.
pub fn normalize_formatting(text: &UniversalText) -> UniversalText {
    let formatted = format_raw_text(&text.raw_text);
    if formatted == text.raw_text {
        return text.clone();
    }
    let tokens = relocate_spans(&text.tokens, &formatted);
    text.derive(formatted, tokens)
}

/// Re-find every spanned token in `raw`, visiting them in their old text order
pub(crate) fn relocate_spans(tokens: &[Token], raw: &str) -> Vec<Token> {
    let mut order: Vec<usize> = (0..tokens.len())
        .filter(|&i| tokens[i].span.is_some())
        .collect();
    order.sort_by_key(|&i| tokens[i].span.map(|s| s.start));

    let mut relocated = tokens.to_vec();
    let mut locator = SpanLocator::new(raw);
    let mut lost = 0usize;
    for i in order {
        let span = locator.locate(&tokens[i].text);
        lost += usize::from(span.is_none());
        relocated[i].span = span;
    }
    if lost > 0 {
        tracing::debug!("[NORMALIZE] {lost} token spans could not be relocated after reformatting");
    }
    relocated
}
