use std::sync::LazyLock;

use regex::{Captures, Regex};

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title\s*>").expect("valid regex"));
static LANG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<html\b[^>]*\blang\s*=\s*["']?([A-Za-z]{2,3}(?:-[A-Za-z0-9]+)*)"#)
        .expect("valid regex")
});
static COMMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static INVISIBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<head\b.*?</head\s*>|<script\b.*?</script\s*>|<style\b.*?</style\s*>|<noscript\b.*?</noscript\s*>|<template\b.*?</template\s*>|<svg\b.*?</svg\s*>",
    )
    .expect("valid regex")
});
static BLOCK_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)</?(?:p|div|br|hr|li|ul|ol|dl|dt|dd|h[1-6]|tr|table|section|article|aside|header|footer|nav|main|blockquote|pre|figcaption)\b[^>]*>",
    )
    .expect("valid regex")
});
static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static ENTITIES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid regex"));

/// Readable content of an HTML document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HtmlDocument {
    pub title: Option<String>,
    pub language: Option<String>,
    /// One line per block element, no blank lines
    pub text: String,
}

pub fn html_to_document(html: &str) -> HtmlDocument {
    let title = TITLE
        .captures(html)
        .map(|c| collapse_spaces(&decode_entities(&c[1])))
        .filter(|t| !t.is_empty());
    let language = LANG.captures(html).map(|c| c[1].to_lowercase());

    let body = COMMENTS.replace_all(html, "");
    let body = INVISIBLE.replace_all(&body, "");
    let body = BLOCK_TAGS.replace_all(&body, "\n");
    let body = TAGS.replace_all(&body, "");
    let body = decode_entities(&body);

    let text = body
        .lines()
        .map(collapse_spaces)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    HtmlDocument {
        title,
        language,
        text,
    }
}

fn collapse_spaces(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(text: &str) -> String {
    ENTITIES
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse().ok().and_then(char::from_u32)
            } else {
                named_entity(entity)
            };
            decoded.map_or_else(|| caps[0].to_string(), |c| c.to_string())
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "mdash" => '—',
        "ndash" => '–',
        "hellip" => '…',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "copy" => '©',
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en-US">
<head><title>  Daily &amp; Weekly </title><style>p { color: red }</style></head>
<body>
  <!-- tracking -->
  <nav>Home</nav>
  <h1>Big   news</h1>
  <p>First <b>bold</b> paragraph.<br>Second line &#8212; here&nbsp;now</p>
  <script>var x = "<p>not text</p>";</script>
  <p>Fish &lt;3 chips &#x41;</p>
</body>
</html>"#;

    #[test]
    fn test_extracts_title_language_and_blocks() {
        let doc = html_to_document(PAGE);
        assert_eq!(doc.title.as_deref(), Some("Daily & Weekly"));
        assert_eq!(doc.language.as_deref(), Some("en-us"));
        assert_eq!(
            doc.text,
            "Home\nBig news\nFirst bold paragraph.\nSecond line — here now\nFish <3 chips A"
        );
    }

    #[test]
    fn test_unknown_entities_are_kept() {
        assert_eq!(decode_entities("a &bogus; b"), "a &bogus; b");
    }

    #[test]
    fn test_plain_fragment_without_head() {
        let doc = html_to_document("<div>Only text</div>");
        assert_eq!(doc.title, None);
        assert_eq!(doc.text, "Only text");
    }
}
