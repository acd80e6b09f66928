use serde::{Deserialize, Serialize};

/// What produced an element node in the rendered surface.
///
/// The set mirrors what the markdown pipeline emits, plus [`ElementKind::Marker`]
/// which only ever appears when a dog-eared passage has been wrapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    Paragraph,
    Heading(u8),
    BlockQuote,
    CodeBlock,
    List,
    Item,
    Emphasis,
    Strong,
    Strikethrough,
    Link(String),
    CodeSpan,
    HardBreak,
    Rule,
    /// The dog-ear passage wrapper.
    Marker,
    /// Anything the renderer passed through without a dedicated kind.
    Other,
}

/// An element in the rendered surface tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementNode {
    pub kind: ElementKind,
    pub children: Vec<SurfaceNode>,
}

impl ElementNode {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: ElementKind, children: Vec<SurfaceNode>) -> Self {
        Self { kind, children }
    }
}

/// One node of the rendered surface: either a run of literal text or an
/// element containing further nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceNode {
    Text(String),
    Element(ElementNode),
}

impl SurfaceNode {
    pub fn text(s: impl Into<String>) -> Self {
        SurfaceNode::Text(s.into())
    }

    pub fn element(kind: ElementKind, children: Vec<SurfaceNode>) -> Self {
        SurfaceNode::Element(ElementNode::with_children(kind, children))
    }
}

/// Path to a node: child indices from the surface root downward.
pub type NodePath = Vec<usize>;

/// A located occurrence of a passage: the text node that contains it and the
/// byte range of the match within that node's string.
///
/// Never persisted — recomputed against the current surface on every render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocateResult {
    pub path: NodePath,
    pub start: usize,
    pub end: usize,
}

/// The rendered text surface of one footnote body: a tree of text-bearing
/// nodes produced by the markdown pipeline.
///
/// The dog-ear subsystem owns mutation of this tree only through the passage
/// marker; everything else treats it as read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSurface {
    pub children: Vec<SurfaceNode>,
}

impl TextSurface {
    pub fn new(children: Vec<SurfaceNode>) -> Self {
        Self { children }
    }

    /// Child list of the element at `path` (the root list for an empty path).
    ///
    /// Returns `None` if the path points at a text node or out of bounds.
    pub fn children_at_mut(&mut self, path: &[usize]) -> Option<&mut Vec<SurfaceNode>> {
        let mut children = &mut self.children;
        for &index in path {
            match children.get_mut(index)? {
                SurfaceNode::Element(el) => children = &mut el.children,
                SurfaceNode::Text(_) => return None,
            }
        }
        Some(children)
    }

    /// The node at `path`, if any.
    pub fn node_at(&self, path: &[usize]) -> Option<&SurfaceNode> {
        let (&last, parent) = path.split_last()?;
        let mut children = &self.children;
        for &index in parent {
            match children.get(index)? {
                SurfaceNode::Element(el) => children = &el.children,
                SurfaceNode::Text(_) => return None,
            }
        }
        children.get(last)
    }

    /// Concatenated text content of the whole surface, ignoring all element
    /// structure (marker wrappers included).
    pub fn plain_text(&self) -> String {
        fn collect(nodes: &[SurfaceNode], out: &mut String) {
            for node in nodes {
                match node {
                    SurfaceNode::Text(text) => out.push_str(text),
                    SurfaceNode::Element(el) => collect(&el.children, out),
                }
            }
        }
        let mut out = String::new();
        collect(&self.children, &mut out);
        out
    }
}
