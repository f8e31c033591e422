use serde::{Deserialize, Serialize};

/// Screen-space rectangle of a token, in pixels.
///
/// Always non-negative with `right > left` and `bottom > top`; use
/// [`BoundingBox::new`] to build one from untrusted coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    /// Returns `None` for negative, inverted, empty or non-finite rectangles
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Option<Self> {
        let finite = [left, top, right, bottom].iter().all(|v| v.is_finite());
        if !finite || left < 0.0 || top < 0.0 || right <= left || bottom <= top {
            return None;
        }
        Some(Self {
            left,
            top,
            right,
            bottom,
        })
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> (f32, f32) {
        (
            self.left + self.width() / 2.0,
            self.top + self.height() / 2.0,
        )
    }

    /// Smallest box containing both
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Horizontal slice `[from, to)` of this box, expressed as fractions of its width
    pub fn horizontal_slice(&self, from: f32, to: f32) -> Option<BoundingBox> {
        let width = self.width();
        BoundingBox::new(
            self.left + width * from.clamp(0.0, 1.0),
            self.top,
            self.left + width * to.clamp(0.0, 1.0),
            self.bottom,
        )
    }
}

/// Byte range of a token inside the raw text that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    /// Returns `None` unless `end > start`
    pub fn new(start: usize, end: usize) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    pub fn shifted(&self, by: usize) -> TextSpan {
        TextSpan {
            start: self.start + by,
            end: self.end + by,
        }
    }

    pub fn overlaps(&self, other: &TextSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}
