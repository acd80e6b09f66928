//! Markdown rendering for Footnotes.
//!
//! Converts a footnote body into the [`TextSurface`] tree the dog-ear
//! subsystem works against. Consecutive text runs (including soft breaks)
//! inside one inline context collapse into a single text node, the way a
//! browser coalesces text; emphasis, links, and other inline wrappers start
//! a new node. Raw HTML in the body is not rendered.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag};

use crate::types::surface::{ElementKind, ElementNode, SurfaceNode, TextSurface};

/// Renders a markdown body into a text surface.
pub fn render_markdown(body: &str) -> TextSurface {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut builder = SurfaceBuilder::default();
    for event in Parser::new_ext(body, options) {
        match event {
            Event::Start(tag) => builder.start(kind_for(&tag)),
            Event::End(_) => builder.end(),
            Event::Text(text) => builder.text(&text),
            Event::Code(code) => builder.leaf_with_text(ElementKind::CodeSpan, &code),
            Event::SoftBreak => builder.text("\n"),
            Event::HardBreak => builder.leaf(ElementKind::HardBreak),
            Event::Rule => builder.leaf(ElementKind::Rule),
            // Raw HTML, footnote refs, and task markers are dropped from the
            // rendered surface.
            Event::Html(_)
            | Event::InlineHtml(_)
            | Event::FootnoteReference(_)
            | Event::TaskListMarker(_) => {}
        }
    }
    builder.finish()
}

fn kind_for(tag: &Tag) -> ElementKind {
    match tag {
        Tag::Paragraph => ElementKind::Paragraph,
        Tag::Heading { level, .. } => ElementKind::Heading(heading_depth(*level)),
        Tag::BlockQuote => ElementKind::BlockQuote,
        Tag::CodeBlock(_) => ElementKind::CodeBlock,
        Tag::List(_) => ElementKind::List,
        Tag::Item => ElementKind::Item,
        Tag::Emphasis => ElementKind::Emphasis,
        Tag::Strong => ElementKind::Strong,
        Tag::Strikethrough => ElementKind::Strikethrough,
        Tag::Link { dest_url, .. } => ElementKind::Link(dest_url.to_string()),
        _ => ElementKind::Other,
    }
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Incremental surface builder driven by parser events.
///
/// Buffers text until an element boundary forces a flush, so each text node
/// holds the longest contiguous run the surface will ever see.
#[derive(Default)]
struct SurfaceBuilder {
    root: Vec<SurfaceNode>,
    stack: Vec<ElementNode>,
    pending: String,
}

impl SurfaceBuilder {
    fn text(&mut self, text: &str) {
        self.pending.push_str(text);
    }

    fn start(&mut self, kind: ElementKind) {
        self.flush();
        self.stack.push(ElementNode::new(kind));
    }

    fn end(&mut self) {
        self.flush();
        if let Some(el) = self.stack.pop() {
            self.push_node(SurfaceNode::Element(el));
        }
    }

    fn leaf(&mut self, kind: ElementKind) {
        self.flush();
        self.push_node(SurfaceNode::Element(ElementNode::new(kind)));
    }

    fn leaf_with_text(&mut self, kind: ElementKind, text: &str) {
        self.flush();
        self.push_node(SurfaceNode::Element(ElementNode::with_children(
            kind,
            vec![SurfaceNode::text(text)],
        )));
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending);
        self.push_node(SurfaceNode::Text(text));
    }

    fn push_node(&mut self, node: SurfaceNode) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.push(node),
        }
    }

    fn finish(mut self) -> TextSurface {
        self.flush();
        while let Some(el) = self.stack.pop() {
            // Unbalanced start/end from the parser; close what remains.
            match self.stack.last_mut() {
                Some(parent) => parent.children.push(SurfaceNode::Element(el)),
                None => self.root.push(SurfaceNode::Element(el)),
            }
        }
        TextSurface::new(self.root)
    }
}
