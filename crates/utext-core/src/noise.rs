use unicode_normalization::UnicodeNormalization;
use utext_types::{TextSpan, Token, UniversalText};

const ALWAYS_DENIED: &[&str] = &[
    "advertisement",
    "sponsored",
    "promoted",
    "cookie",
    "subscribe",
    "newsletter",
    "sign up",
    "accept all",
    "privacy policy",
    "terms of service",
];

const NAVIGATION: &[&str] = &[
    "navigation",
    "menu",
    "breadcrumb",
    "skip to",
    "back to top",
    "sitemap",
];

const HEADERS: &[&str] = &["header", "banner", "masthead"];

/// Substring denylists for boilerplate tokens. Entries are matched against
/// the NFKC-folded, lowercased token text.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    pub always: Vec<String>,
    pub navigation: Vec<String>,
    pub headers: Vec<String>,
}

impl Default for NoiseFilter {
    fn default() -> Self {
        let owned = |list: &[&str]| -> Vec<String> { list.iter().map(|s| s.to_string()).collect() };
        Self {
            always: owned(ALWAYS_DENIED),
            navigation: owned(NAVIGATION),
            headers: owned(HEADERS),
        }
    }
}

impl NoiseFilter {
    pub fn is_noise(&self, token: &Token, keep_headers: bool, keep_navigation: bool) -> bool {
        let folded: String = token.text.nfkc().collect::<String>().to_lowercase();
        let hit = |list: &[String]| list.iter().any(|entry| folded.contains(entry.as_str()));

        hit(&self.always)
            || (!keep_navigation && hit(&self.navigation))
            || (!keep_headers && hit(&self.headers))
    }

    /// Drop noise tokens and rebuild the raw text from the survivors.
    ///
    /// The rebuilt text joins tokens with single spaces, so original line
    /// breaks are lost.
    pub fn apply(
        &self,
        text: &UniversalText,
        keep_headers: bool,
        keep_navigation: bool,
    ) -> UniversalText {
        let mut raw_text = String::new();
        let mut tokens = Vec::new();

        for token in &text.tokens {
            if self.is_noise(token, keep_headers, keep_navigation) {
                tracing::trace!("[NORMALIZE] Dropping noise token {:?}", token.text);
                continue;
            }
            if !raw_text.is_empty() {
                raw_text.push(' ');
            }
            let start = raw_text.len();
            raw_text.push_str(&token.text);
            tokens.push(token.clone().with_span(TextSpan::new(start, raw_text.len())));
        }

        tracing::debug!(
            "[NORMALIZE] Noise filter kept {} of {} tokens",
            tokens.len(),
            text.tokens.len()
        );
        text.derive(raw_text, tokens)
    }
}

/// [`NoiseFilter::apply`] with the default denylists
pub fn filter_noise(text: &UniversalText, keep_headers: bool, keep_navigation: bool) -> UniversalText {
    NoiseFilter::default().apply(text, keep_headers, keep_navigation)
}
