//! Selection capture for Footnotes.
//!
//! Watches the reader's text-selection gestures over a footnote body and
//! turns them into validated [`Selection`] values for the dog-ear control.
//! The platform's global selection state sits behind the [`SelectionSource`]
//! capability so the component can be driven deterministically in tests.
//!
//! The host listens for pointer-release and click events at the document
//! level (a drag may end outside the body, and outside-clicks must close the
//! affordance wherever they land) and calls in once the platform selection
//! has settled after the raw event.

use crate::types::selection::{Point, RawSelection, Rect, Selection};

/// Vertical gap between the top of the selection and the confirmation
/// control anchored above it.
const ANCHOR_GAP: f64 = 8.0;

/// Capability interface over the platform's current text selection.
pub trait SelectionSource {
    /// The current selection, or `None` when nothing is selected.
    fn current_selection(&self) -> Option<RawSelection>;

    /// Drops the platform selection (called after a confirmed dog-ear).
    fn clear_selection(&mut self);
}

/// Outcome of evaluating a selection gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    /// A valid selection inside the content region.
    Selected(Selection),
    /// The selection collapsed, emptied, or left the content region; any
    /// visible confirmation affordance should be dismissed.
    Cleared,
}

/// Where a document-level click landed, as far as capture cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// On the confirmation affordance itself.
    Affordance,
    /// Anywhere else.
    Outside,
}

/// Captures selection gestures within one footnote's content region.
pub struct SelectionCapture<S: SelectionSource> {
    source: S,
    region: Rect,
}

impl<S: SelectionSource> SelectionCapture<S> {
    pub fn new(source: S, region: Rect) -> Self {
        Self { source, region }
    }

    /// Updates the content region bounds after a layout change.
    pub fn set_region(&mut self, region: Rect) {
        self.region = region;
    }

    /// Evaluates the platform selection at the end of a selection gesture.
    ///
    /// Validation order: the selection must be non-collapsed, its trimmed
    /// text non-empty, and its range fully contained in the content region.
    /// Any failed check yields [`SelectionEvent::Cleared`].
    pub fn pointer_released(&self) -> SelectionEvent {
        let Some(raw) = self.source.current_selection() else {
            return SelectionEvent::Cleared;
        };
        if raw.collapsed {
            return SelectionEvent::Cleared;
        }
        let text = raw.text.trim();
        if text.is_empty() {
            return SelectionEvent::Cleared;
        }
        if !self.region.contains_rect(&raw.bounds) {
            return SelectionEvent::Cleared;
        }

        // Anchor at the horizontal midpoint of the selection's top edge,
        // relative to the content region, nudged up to clear the text line.
        let anchor = Point {
            x: raw.bounds.x + raw.bounds.width / 2.0 - self.region.x,
            y: raw.bounds.y - self.region.y - ANCHOR_GAP,
        };

        SelectionEvent::Selected(Selection {
            text: text.to_string(),
            anchor,
        })
    }

    /// Handles a document-level click. Clicks on the affordance are the
    /// confirm path and never clear; an outside click clears once the
    /// platform selection has collapsed.
    pub fn clicked(&self, target: ClickTarget) -> Option<SelectionEvent> {
        if target == ClickTarget::Affordance {
            return None;
        }
        match self.source.current_selection() {
            Some(raw) if !raw.collapsed => None,
            _ => Some(SelectionEvent::Cleared),
        }
    }

    /// Drops the platform selection after the pending passage was confirmed.
    pub fn clear_platform_selection(&mut self) {
        self.source.clear_selection();
    }
}
