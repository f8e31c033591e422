use std::cmp::Ordering;

use utext_types::{Token, UniversalText};

/// Top-to-bottom, then left-to-right. Tokens without a box go after all
/// positioned ones, keeping their relative order.
fn reading_order(a: &Token, b: &Token) -> Ordering {
    match (a.bounding_box, b.bounding_box) {
        (Some(a), Some(b)) => a.top.total_cmp(&b.top).then(a.left.total_cmp(&b.left)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort of tokens into reading order; each index becomes its rank.
pub fn order_by_reading_sequence(text: &UniversalText) -> UniversalText {
    let mut tokens = text.tokens.clone();
    tokens.sort_by(reading_order);
    let tokens = tokens
        .into_iter()
        .enumerate()
        .map(|(rank, token)| token.with_index(rank))
        .collect();
    text.with_tokens(tokens)
}
