//! Unit tests for the markdown-to-surface renderer.
//!
//! These tests pin down the text-node shape the locator depends on:
//! contiguous runs coalesce into one node, inline wrappers split nodes.

use footnotes::services::locator::locate;
use footnotes::services::markdown::render_markdown;
use footnotes::types::surface::{ElementKind, SurfaceNode};

#[test]
fn paragraph_renders_to_single_text_node() {
    let surface = render_markdown("Just say what you mean and stop.");

    assert_eq!(surface.children.len(), 1);
    let SurfaceNode::Element(p) = &surface.children[0] else {
        panic!("expected paragraph");
    };
    assert_eq!(p.kind, ElementKind::Paragraph);
    assert_eq!(
        p.children,
        vec![SurfaceNode::text("Just say what you mean and stop.")]
    );
}

#[test]
fn soft_break_merges_into_one_text_node() {
    let surface = render_markdown("first line\nsecond line");

    let SurfaceNode::Element(p) = &surface.children[0] else {
        panic!("expected paragraph");
    };
    assert_eq!(
        p.children,
        vec![SurfaceNode::text("first line\nsecond line")],
        "a soft break stays inside the same text node"
    );
}

#[test]
fn emphasis_splits_text_nodes() {
    let surface = render_markdown("what *really* matters");

    let SurfaceNode::Element(p) = &surface.children[0] else {
        panic!("expected paragraph");
    };
    assert_eq!(
        p.children,
        vec![
            SurfaceNode::text("what "),
            SurfaceNode::element(ElementKind::Emphasis, vec![SurfaceNode::text("really")]),
            SurfaceNode::text(" matters"),
        ]
    );
}

#[test]
fn heading_level_is_preserved() {
    let surface = render_markdown("## On writing");

    let SurfaceNode::Element(h) = &surface.children[0] else {
        panic!("expected heading");
    };
    assert_eq!(h.kind, ElementKind::Heading(2));
    assert_eq!(h.children, vec![SurfaceNode::text("On writing")]);
}

#[test]
fn hard_break_splits_text_nodes() {
    let surface = render_markdown("first line  \nsecond line");

    let SurfaceNode::Element(p) = &surface.children[0] else {
        panic!("expected paragraph");
    };
    assert_eq!(
        p.children,
        vec![
            SurfaceNode::text("first line"),
            SurfaceNode::element(ElementKind::HardBreak, vec![]),
            SurfaceNode::text("second line"),
        ]
    );
}

#[test]
fn inline_code_becomes_code_span() {
    let surface = render_markdown("run `cargo doc` locally");

    let SurfaceNode::Element(p) = &surface.children[0] else {
        panic!("expected paragraph");
    };
    assert_eq!(
        p.children,
        vec![
            SurfaceNode::text("run "),
            SurfaceNode::element(ElementKind::CodeSpan, vec![SurfaceNode::text("cargo doc")]),
            SurfaceNode::text(" locally"),
        ]
    );
}

#[test]
fn link_keeps_destination_and_text() {
    let surface = render_markdown("see [the help page](https://example.com/help) first");

    let SurfaceNode::Element(p) = &surface.children[0] else {
        panic!("expected paragraph");
    };
    assert_eq!(
        p.children[1],
        SurfaceNode::element(
            ElementKind::Link("https://example.com/help".to_string()),
            vec![SurfaceNode::text("the help page")]
        )
    );
}

#[test]
fn multiple_paragraphs_become_sibling_blocks() {
    let surface = render_markdown("First thought.\n\nSecond thought.");

    assert_eq!(surface.children.len(), 2);
    assert_eq!(surface.plain_text(), "First thought.Second thought.");
}

#[test]
fn raw_html_is_dropped() {
    let surface = render_markdown("before\n\n<div>markup</div>\n\nafter");
    let text = surface.plain_text();
    assert!(!text.contains("<div>"), "raw HTML should not render");
    assert!(text.contains("before"));
    assert!(text.contains("after"));
}

#[test]
fn phrase_across_emphasis_boundary_does_not_locate() {
    // Rendered markdown feeds the locator: the emphasis wrapper splits the
    // phrase across nodes, so the single-node policy reports not-found.
    let surface = render_markdown("what *really* matters");
    assert_eq!(locate(&surface, "really matters"), None);
    assert!(locate(&surface, "really").is_some());
}

#[test]
fn phrase_in_plain_run_locates_after_rendering() {
    let body = "There's something liberating about writing without a word count target.";
    let surface = render_markdown(body);
    let result = locate(&surface, "liberating about writing").expect("should locate");
    assert_eq!(result.path, vec![0, 0]);
}
