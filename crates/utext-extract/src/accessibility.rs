use std::borrow::Cow;
use std::time::Instant;

use async_trait::async_trait;
use utext_config::accessibility::AccessibilityConfig;
use utext_types::{
    BoundingBox, SourceType, TextBuilder, TextDetectionResult, TextMetadata, UiNode,
};

use crate::error::NodeError;
use crate::extractor::TextExtractor;

/// Read access to one node of a UI accessibility tree.
///
/// Live platform handles implement this directly; `&UiNode` implements it
/// for snapshots.
pub trait AccessibilityNode: Sized {
    fn text(&self) -> Option<Cow<'_, str>>;

    fn bounds(&self) -> Option<BoundingBox>;

    fn is_password(&self) -> bool;

    fn is_sensitive(&self) -> bool {
        false
    }

    fn children(&self) -> Result<Vec<Self>, NodeError>;
}

impl<'a> AccessibilityNode for &'a UiNode {
    fn text(&self) -> Option<Cow<'_, str>> {
        let visible = self.text.as_deref().filter(|t| !t.trim().is_empty());
        visible
            .or(self.content_description.as_deref())
            .map(Cow::Borrowed)
    }

    fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }

    fn is_password(&self) -> bool {
        self.password
    }

    fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    fn children(&self) -> Result<Vec<Self>, NodeError> {
        let node: &'a UiNode = *self;
        Ok(node.children.iter().collect())
    }
}

/// Walks an accessibility tree into word tokens with exact offsets
#[derive(Debug, Clone)]
pub struct AccessibilityExtractor {
    max_depth: usize,
    max_tokens: usize,
}

impl Default for AccessibilityExtractor {
    fn default() -> Self {
        Self::new(&AccessibilityConfig::default())
    }
}

impl AccessibilityExtractor {
    pub fn new(config: &AccessibilityConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_tokens: config.max_tokens,
        }
    }

    pub fn walk<N: AccessibilityNode>(&self, root: Option<N>) -> TextDetectionResult {
        let Some(root) = root else {
            return TextDetectionResult::error("accessibility root is not available");
        };

        let started = Instant::now();
        let mut builder = TextBuilder::new(SourceType::Accessibility);
        if let Err(e) = self.visit(&root, 0, &mut builder) {
            tracing::error!("[A11Y] Walk failed at root: {}", e);
            return TextDetectionResult::error_with("failed to read accessibility root", e);
        }

        let text = builder.finish().with_metadata(TextMetadata {
            confidence: Some(1.0),
            capture_duration: Some(started.elapsed()),
            ..TextMetadata::default()
        });
        tracing::debug!(
            "[A11Y] Walk produced {} tokens in {:?}",
            text.tokens.len(),
            started.elapsed()
        );
        TextDetectionResult::from_text(text)
    }

    /// Only a failure to list the root's children propagates; deeper
    /// failures skip that subtree.
    fn visit<N: AccessibilityNode>(
        &self,
        node: &N,
        depth: usize,
        builder: &mut TextBuilder,
    ) -> Result<(), NodeError> {
        if depth >= self.max_depth || builder.token_count() >= self.max_tokens {
            return Ok(());
        }
        if node.is_password() || node.is_sensitive() {
            return Ok(());
        }

        if let Some(text) = node.text() {
            self.append_node_text(&text, node.bounds(), builder);
        }

        let children = match node.children() {
            Ok(children) => children,
            Err(e) if depth == 0 => return Err(e),
            Err(e) => {
                tracing::warn!("[A11Y] Skipping unreadable subtree at depth {}: {}", depth, e);
                return Ok(());
            }
        };

        for child in &children {
            self.visit(child, depth + 1, builder)?;
        }
        Ok(())
    }

    /// One token per word. A single-word line gets the whole node box, words
    /// of a longer line get slices of it sized by their character share.
    ///
    /// Nodes follow each other with a space; only line breaks inside a
    /// node's own text become `\n`.
    fn append_node_text(&self, text: &str, bounds: Option<BoundingBox>, builder: &mut TextBuilder) {
        let mut node_has_content = false;
        for line in text.lines() {
            let words: Vec<&str> = line.split_whitespace().collect();
            let total_chars: usize = words.iter().map(|w| w.chars().count()).sum();
            if total_chars == 0 {
                continue;
            }
            if node_has_content {
                builder.end_line();
            }
            node_has_content = true;

            let mut consumed = 0usize;
            for word in &words {
                if builder.token_count() >= self.max_tokens {
                    return;
                }
                let chars = word.chars().count();
                let bounding_box = if words.len() == 1 {
                    bounds
                } else {
                    let from = consumed as f32 / total_chars as f32;
                    let to = (consumed + chars) as f32 / total_chars as f32;
                    bounds.and_then(|b| b.horizontal_slice(from, to))
                };
                consumed += chars;
                builder.push_word(word, bounding_box, 1.0);
            }
        }
    }
}

#[async_trait]
impl TextExtractor for AccessibilityExtractor {
    type Input = Option<UiNode>;

    fn source_type(&self) -> SourceType {
        SourceType::Accessibility
    }

    async fn extract(&self, input: Self::Input) -> TextDetectionResult {
        self.walk(input.as_ref())
    }
}
