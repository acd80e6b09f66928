//! Text locator for Footnotes.
//!
//! Finds a stored dog-ear passage inside a rendered surface. The search is a
//! pre-order walk over the surface's text nodes; each node's string is tested
//! independently, so a passage that spans a node boundary (for example split
//! across an emphasis wrapper) is reported as not found. Matching is exact:
//! case-sensitive, whitespace-sensitive, no normalization.

use crate::types::surface::{LocateResult, SurfaceNode, TextSurface};

/// Locates the first occurrence of `needle` within a single text node of the
/// surface, in document order.
///
/// Returns `None` for an empty needle, and for a needle that only occurs
/// split across sibling nodes.
pub fn locate(surface: &TextSurface, needle: &str) -> Option<LocateResult> {
    if needle.is_empty() {
        return None;
    }
    let mut path = Vec::new();
    locate_in(&surface.children, needle, &mut path)
}

fn locate_in(
    nodes: &[SurfaceNode],
    needle: &str,
    path: &mut Vec<usize>,
) -> Option<LocateResult> {
    for (index, node) in nodes.iter().enumerate() {
        path.push(index);
        match node {
            SurfaceNode::Text(text) => {
                if let Some(start) = text.find(needle) {
                    let result = LocateResult {
                        path: path.clone(),
                        start,
                        end: start + needle.len(),
                    };
                    path.pop();
                    return Some(result);
                }
            }
            SurfaceNode::Element(el) => {
                if let Some(found) = locate_in(&el.children, needle, path) {
                    path.pop();
                    return Some(found);
                }
            }
        }
        path.pop();
    }
    None
}
