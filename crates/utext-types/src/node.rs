use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;

/// Owned snapshot of one accessibility node and its subtree.
///
/// This is the form a platform bridge hands over (or a JSON dump is read
/// into); live handles implement the extractor's node trait directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiNode {
    pub text: Option<String>,
    pub content_description: Option<String>,
    pub bounds: Option<BoundingBox>,
    pub password: bool,
    pub sensitive: bool,
    pub children: Vec<UiNode>,
}

impl UiNode {
    pub fn with_text(text: impl Into<String>, bounds: Option<BoundingBox>) -> Self {
        Self {
            text: Some(text.into()),
            bounds,
            ..Self::default()
        }
    }

    pub fn container(children: Vec<UiNode>) -> Self {
        Self {
            children,
            ..Self::default()
        }
    }
}
