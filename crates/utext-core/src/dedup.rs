use std::collections::HashSet;

use utext_types::{Token, UniversalText};

/// Text plus the bit pattern of the box center. Exact float equality is
/// intended: duplicates come from the same node reported twice.
type DedupKey = (String, (u32, u32));

fn dedup_key(token: &Token) -> Option<DedupKey> {
    let (x, y) = token.bounding_box?.center();
    Some((token.text.clone(), (x.to_bits(), y.to_bits())))
}

/// Drop tokens that repeat an earlier token's text at the same position.
///
/// Tokens without a bounding box have no position to compare and are always
/// kept. Order is preserved and raw text is untouched.
pub fn remove_duplicates(text: &UniversalText) -> UniversalText {
    let mut seen: HashSet<DedupKey> = HashSet::new();
    let tokens: Vec<Token> = text
        .tokens
        .iter()
        .filter(|token| match dedup_key(token) {
            Some(key) => seen.insert(key),
            None => true,
        })
        .cloned()
        .collect();

    let removed = text.tokens.len() - tokens.len();
    if removed > 0 {
        tracing::debug!("[NORMALIZE] Removed {removed} duplicate tokens");
    }
    text.with_tokens(tokens)
}
