//! Passage marker for Footnotes.
//!
//! Wraps a located dog-ear passage in a marker element, and removes markers
//! again before every re-render. Mutation is confined to the surface tree the
//! caller hands in; callers always clear before applying, so repeated
//! renders never accumulate stale markers.

use crate::types::surface::{ElementKind, ElementNode, LocateResult, SurfaceNode, TextSurface};

/// Removes every marker wrapper from the surface, restoring the original
/// text node structure. Adjacent text fragments left behind by a previous
/// split are merged back into a single node.
pub fn clear_markers(surface: &mut TextSurface) {
    unwrap_markers(&mut surface.children);
}

/// Wraps the located range in a [`ElementKind::Marker`] element, splitting
/// the host text node into before/marked/after fragments as needed.
///
/// A `None` locate result is a no-op: the stored passage no longer occurs in
/// the current render and no marker is shown. A stale result that no longer
/// addresses a text node, or whose range does not fall on character
/// boundaries, degrades the same way.
pub fn apply_marker(surface: &mut TextSurface, located: Option<&LocateResult>) {
    let Some(located) = located else {
        return;
    };
    let Some((&index, parent_path)) = located.path.split_last() else {
        return;
    };
    let Some(children) = surface.children_at_mut(parent_path) else {
        return;
    };
    let Some(SurfaceNode::Text(text)) = children.get(index) else {
        return;
    };
    if located.start > located.end
        || located.end > text.len()
        || !text.is_char_boundary(located.start)
        || !text.is_char_boundary(located.end)
    {
        return;
    }

    let text = text.clone();
    let before = &text[..located.start];
    let marked = &text[located.start..located.end];
    let after = &text[located.end..];

    let mut replacement = Vec::with_capacity(3);
    if !before.is_empty() {
        replacement.push(SurfaceNode::text(before));
    }
    replacement.push(SurfaceNode::Element(ElementNode::with_children(
        ElementKind::Marker,
        vec![SurfaceNode::text(marked)],
    )));
    if !after.is_empty() {
        replacement.push(SurfaceNode::text(after));
    }

    children.splice(index..=index, replacement);
}

/// Replaces marker elements with their text content and merges adjacent
/// text siblings, recursing through the rest of the tree untouched.
fn unwrap_markers(nodes: &mut Vec<SurfaceNode>) {
    let drained = std::mem::take(nodes);
    for node in drained {
        match node {
            SurfaceNode::Element(el) if el.kind == ElementKind::Marker => {
                let mut text = String::new();
                collect_text(&el.children, &mut text);
                push_text(nodes, text);
            }
            SurfaceNode::Element(mut el) => {
                unwrap_markers(&mut el.children);
                nodes.push(SurfaceNode::Element(el));
            }
            SurfaceNode::Text(text) => push_text(nodes, text),
        }
    }
}

fn collect_text(nodes: &[SurfaceNode], out: &mut String) {
    for node in nodes {
        match node {
            SurfaceNode::Text(text) => out.push_str(text),
            SurfaceNode::Element(el) => collect_text(&el.children, out),
        }
    }
}

/// Appends text to the node list, merging with a trailing text node.
fn push_text(nodes: &mut Vec<SurfaceNode>, text: String) {
    if text.is_empty() {
        return;
    }
    if let Some(SurfaceNode::Text(prev)) = nodes.last_mut() {
        prev.push_str(&text);
    } else {
        nodes.push(SurfaceNode::Text(text));
    }
}
