use serde::{Deserialize, Serialize};

/// A 2D point in the content region's own coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// An axis-aligned rectangle in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True if `other` lies entirely inside this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// The platform's current text selection, as reported by a
/// [`SelectionSource`](crate::services::selection_capture::SelectionSource).
///
/// Raw and untrusted: text is not yet trimmed and the bounds may extend
/// outside the content region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSelection {
    /// True when the selection has zero extent (a bare caret).
    pub collapsed: bool,
    /// Literal text content of the selection.
    pub text: String,
    /// Bounding box of the selected range, in page coordinates.
    pub bounds: Rect,
}

/// A validated selection inside the content region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Trimmed, non-empty literal text of the selection.
    pub text: String,
    /// Where to place the confirmation control: the horizontal midpoint of
    /// the selection at its top edge, relative to the content region.
    pub anchor: Point,
}
