pub mod builder;
pub mod detection;
pub mod event;
pub mod geometry;
pub mod node;
pub mod text;

pub use builder::TextBuilder;
pub use detection::{DetectionContext, ImageData, ImageFormat, SharedError, TextDetectionResult};
pub use event::HighlightEvent;
pub use geometry::{BoundingBox, TextSpan};
pub use node::UiNode;
pub use text::{OffsetError, PageInfo, SourceType, TextMetadata, Token, UniversalText};
