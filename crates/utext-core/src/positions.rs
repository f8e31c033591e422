use utext_types::{BoundingBox, Token, UniversalText};

use crate::locate::SpanLocator;

fn fully_mapped(text: &UniversalText) -> bool {
    text.tokens
        .iter()
        .all(|t| t.span.is_some() && t.bounding_box.is_some())
}

/// Fill in missing spans by searching the raw text in token order.
///
/// No-op when every token already has a span and a box, which is always the
/// case for accessibility output.
pub fn map_positions(text: &UniversalText) -> UniversalText {
    if fully_mapped(text) {
        return text.clone();
    }
    text.with_tokens(recover_spans(text))
}

/// [`map_positions`], then give each box-less token the union of the
/// `reference` boxes its span overlaps.
///
/// `reference` must share this text's raw text, typically the value that was
/// fed to `tokenize`.
pub fn map_positions_with(text: &UniversalText, reference: &UniversalText) -> UniversalText {
    if fully_mapped(text) {
        return text.clone();
    }
    let mut tokens = recover_spans(text);

    if reference.raw_text != text.raw_text {
        tracing::debug!("[NORMALIZE] Reference text differs, skipping box interpolation");
        return text.with_tokens(tokens);
    }

    for token in tokens.iter_mut().filter(|t| t.bounding_box.is_none()) {
        token.bounding_box = token.span.and_then(|span| {
            reference
                .tokens
                .iter()
                .filter(|r| r.span.is_some_and(|s| s.overlaps(&span)))
                .filter_map(|r| r.bounding_box)
                .reduce(|acc, b| acc.union(&b))
        });
    }
    text.with_tokens(tokens)
}

fn recover_spans(text: &UniversalText) -> Vec<Token> {
    let mut locator = SpanLocator::new(&text.raw_text);
    text.tokens
        .iter()
        .map(|token| match token.span {
            Some(span) => {
                locator.skip_past(span);
                token.clone()
            }
            None => {
                // Out-of-order tokens fall back to the first occurrence
                let span = locator
                    .locate(&token.text)
                    .or_else(|| SpanLocator::new(&text.raw_text).locate(&token.text));
                token.clone().with_span(span)
            }
        })
        .collect()
}

/// Union of all boxes in a text, the area it covers on screen
pub fn covered_area(text: &UniversalText) -> Option<BoundingBox> {
    text.tokens
        .iter()
        .filter_map(|t| t.bounding_box)
        .reduce(|acc, b| acc.union(&b))
}
