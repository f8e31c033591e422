use std::sync::LazyLock;

use regex::Regex;
use utext_config::TokenizeMode;
use utext_types::{TextSpan, Token, UniversalText};

use crate::locate::SpanLocator;

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[^\S\n]*\n\s*").expect("valid regex"));

/// Terminators that end a sentence only when followed by whitespace or the end
const SPACED_TERMINATORS: &[char] = &['.', '!', '?', '…'];
/// Terminators that always end a sentence (scripts written without spaces)
const CLOSED_TERMINATORS: &[char] = &['。', '！', '？'];

/// Re-segment the raw text at the requested granularity.
///
/// `Word` returns the text unchanged. Other modes produce fresh tokens with
/// exact spans but no bounding box; run `map_positions_with` to recover boxes.
pub fn tokenize(text: &UniversalText, mode: TokenizeMode) -> UniversalText {
    let segments = match mode {
        TokenizeMode::Word => return text.clone(),
        TokenizeMode::Character => characters(&text.raw_text),
        TokenizeMode::Sentence => locate_all(&text.raw_text, sentences(&text.raw_text)),
        TokenizeMode::Paragraph => locate_all(&text.raw_text, paragraphs(&text.raw_text)),
    };

    let tokens: Vec<Token> = segments
        .into_iter()
        .enumerate()
        .map(|(index, (segment, span))| {
            Token::new(segment, index, text.source_type)
                .with_confidence(inherited_confidence(text, span))
                .with_span(Some(span))
        })
        .collect();

    tracing::debug!("[NORMALIZE] Tokenized by {mode:?} into {} tokens", tokens.len());
    text.with_tokens(tokens)
}

fn characters(raw: &str) -> Vec<(String, TextSpan)> {
    raw.char_indices()
        .filter(|(_, c)| !c.is_whitespace())
        .filter_map(|(start, c)| {
            TextSpan::new(start, start + c.len_utf8()).map(|span| (c.to_string(), span))
        })
        .collect()
}

fn sentences(raw: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    for paragraph in paragraphs(raw) {
        let mut start = 0;
        let mut chars = paragraph.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            let next = chars.peek().map(|&(_, n)| n);
            let ends = CLOSED_TERMINATORS.contains(&c)
                || (SPACED_TERMINATORS.contains(&c) && next.is_none_or(char::is_whitespace));
            if ends {
                let end = i + c.len_utf8();
                pieces.push(&paragraph[start..end]);
                start = end;
            }
        }
        pieces.push(&paragraph[start..]);
    }
    pieces
}

fn paragraphs(raw: &str) -> Vec<&str> {
    PARAGRAPH_BREAK.split(raw).collect()
}

/// Trim each segment and find it in order, so repeated segments map to
/// successive occurrences.
fn locate_all(raw: &str, segments: Vec<&str>) -> Vec<(String, TextSpan)> {
    let mut locator = SpanLocator::new(raw);
    segments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|segment| {
            let span = locator.locate(segment);
            if span.is_none() {
                tracing::warn!("[NORMALIZE] Segment {segment:?} not found in raw text");
            }
            span.map(|span| (segment.to_string(), span))
        })
        .collect()
}

/// Mean confidence of the old tokens under `span`, else the text's own
fn inherited_confidence(text: &UniversalText, span: TextSpan) -> f32 {
    let overlapping: Vec<f32> = text
        .tokens
        .iter()
        .filter(|t| t.span.is_some_and(|s| s.overlaps(&span)))
        .map(|t| t.confidence)
        .collect();
    if overlapping.is_empty() {
        text.metadata.confidence.unwrap_or(1.0)
    } else {
        overlapping.iter().sum::<f32>() / overlapping.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use utext_types::{BoundingBox, SourceType, TextBuilder};

    use super::*;

    fn plain(raw: &str) -> UniversalText {
        UniversalText::new(raw, vec![], SourceType::Web)
    }

    fn texts(text: &UniversalText) -> Vec<&str> {
        text.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_word_mode_is_a_no_op() {
        let mut b = TextBuilder::new(SourceType::Ocr);
        b.push_word("Hello", BoundingBox::new(0.0, 0.0, 5.0, 5.0), 0.7);
        b.push_word("world", None, 0.9);
        let text = b.finish();
        assert_eq!(tokenize(&text, TokenizeMode::Word), text);
    }

    #[test]
    fn test_character_mode_skips_whitespace() {
        let tokenized = tokenize(&plain("ab c"), TokenizeMode::Character);
        assert_eq!(texts(&tokenized), vec!["a", "b", "c"]);
        assert_eq!(tokenized.tokens[2].span, TextSpan::new(3, 4));
        assert!(tokenized.validate().is_ok());
    }

    #[test]
    fn test_character_mode_handles_multibyte() {
        let tokenized = tokenize(&plain("日本"), TokenizeMode::Character);
        assert_eq!(texts(&tokenized), vec!["日", "本"]);
        assert!(tokenized.validate().is_ok());
    }

    #[test]
    fn test_sentence_mode_splits_on_terminators() {
        let tokenized = tokenize(
            &plain("It costs 3.50 today. Really?! Yes.\nNext line"),
            TokenizeMode::Sentence,
        );
        assert_eq!(
            texts(&tokenized),
            vec!["It costs 3.50 today.", "Really?!", "Yes.", "Next line"]
        );
        assert!(tokenized.validate().is_ok());
        assert!(tokenized.tokens.iter().all(|t| t.bounding_box.is_none()));
    }

    #[test]
    fn test_sentence_mode_handles_cjk() {
        let tokenized = tokenize(&plain("今日は。明日も！"), TokenizeMode::Sentence);
        assert_eq!(texts(&tokenized), vec!["今日は。", "明日も！"]);
        assert!(tokenized.validate().is_ok());
    }

    #[test]
    fn test_repeated_sentences_get_successive_spans() {
        let tokenized = tokenize(&plain("Go. Go. Go."), TokenizeMode::Sentence);
        let starts: Vec<usize> = tokenized
            .tokens
            .iter()
            .map(|t| t.span.unwrap().start)
            .collect();
        assert_eq!(starts, vec![0, 4, 8]);
    }

    #[test]
    fn test_paragraph_mode_splits_on_blank_lines() {
        let tokenized = tokenize(
            &plain("First para\nstill first.\n\n  \nSecond para."),
            TokenizeMode::Paragraph,
        );
        assert_eq!(
            texts(&tokenized),
            vec!["First para\nstill first.", "Second para."]
        );
        assert!(tokenized.validate().is_ok());
    }

    #[test]
    fn test_regenerated_tokens_inherit_confidence() {
        let mut b = TextBuilder::new(SourceType::Ocr);
        b.push_word("low", None, 0.2);
        b.push_word("high.", None, 0.8);
        let tokenized = tokenize(&b.finish(), TokenizeMode::Sentence);
        assert_eq!(tokenized.tokens.len(), 1);
        assert!((tokenized.tokens[0].confidence - 0.5).abs() < 1e-6);
    }
}
