//! Render nodes: the classified paint tree handed to the rasterizer.

use std::rc::Rc;

use bitflags::bitflags;
use dom::Bounds;
use serde::Serialize;
use style::ComputedStyle;

bitflags! {
    /// Paint-order annotations. `REAL_STACKING_CONTEXT` and `STACKING_CONTEXT` are never
    /// set together.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
    pub struct RenderFlags: u8 {
        /// Positioned or floating without creating a stacking context of its own.
        const STACKING_CONTEXT = 1 << 1;
        /// Establishes a stacking context.
        const REAL_STACKING_CONTEXT = 1 << 2;
        /// `ol`, `ul` or `menu`: owns list item numbering.
        const LIST_OWNER = 1 << 3;
        /// Marked for debug painting.
        const DEBUG = 1 << 4;
    }
}

/// What the rasterizer draws for this node beyond its box.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum RenderNodeKind {
    Element,
    Image { src: String },
    Video,
    Svg,
    Canvas,
    TextInput { value: String, placeholder: String },
    TextArea { value: String },
    Select { value: String },
    IFrame,
}

impl RenderNodeKind {
    /// Replaced content whose subtree the classifier never enters.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(
            self,
            Self::Video | Self::Svg | Self::TextInput { .. } | Self::TextArea { .. } | Self::Select { .. }
        )
    }
}

/// A run of text painted with its owning node's style.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextRun {
    text: String,
    style: Rc<ComputedStyle>,
}

impl TextRun {
    pub(crate) const fn new(text: String, style: Rc<ComputedStyle>) -> Self {
        Self { text, style }
    }

    /// Text with `text-transform` already applied.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    #[must_use]
    pub fn style(&self) -> &ComputedStyle {
        &self.style
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderNode {
    tag: String,
    style: Rc<ComputedStyle>,
    bounds: Bounds,
    flags: RenderFlags,
    kind: RenderNodeKind,
    children: Vec<RenderNode>,
    text_runs: Vec<TextRun>,
}

impl RenderNode {
    pub(crate) const fn new(
        tag: String,
        style: Rc<ComputedStyle>,
        bounds: Bounds,
        flags: RenderFlags,
        kind: RenderNodeKind,
    ) -> Self {
        Self {
            tag,
            style,
            bounds,
            flags,
            kind,
            children: Vec::new(),
            text_runs: Vec::new(),
        }
    }

    pub(crate) fn push_child(&mut self, child: Self) {
        self.children.push(child);
    }

    pub(crate) fn push_text(&mut self, run: TextRun) {
        self.text_runs.push(run);
    }

    pub(crate) fn shared_style(&self) -> Rc<ComputedStyle> {
        Rc::clone(&self.style)
    }

    /// Lowercase tag name of the element this node was built from.
    #[inline]
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[inline]
    #[must_use]
    pub fn style(&self) -> &ComputedStyle {
        &self.style
    }

    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[inline]
    #[must_use]
    pub const fn flags(&self) -> RenderFlags {
        self.flags
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> &RenderNodeKind {
        &self.kind
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn text_runs(&self) -> &[TextRun] {
        &self.text_runs
    }

    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// Serialize the subtree for an out-of-process rasterizer.
    ///
    /// # Errors
    /// Propagates serializer failures.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_and_plain_stacking_bits_differ() {
        assert!(!RenderFlags::REAL_STACKING_CONTEXT.intersects(RenderFlags::STACKING_CONTEXT));
        let flags = RenderFlags::REAL_STACKING_CONTEXT | RenderFlags::LIST_OWNER;
        assert!(flags.contains(RenderFlags::LIST_OWNER));
        assert!(!flags.contains(RenderFlags::DEBUG));
    }

    #[test]
    fn leaf_kinds() {
        assert!(RenderNodeKind::Video.is_leaf());
        assert!(RenderNodeKind::Svg.is_leaf());
        assert!(
            RenderNodeKind::Select {
                value: String::new()
            }
            .is_leaf()
        );
        assert!(!RenderNodeKind::Element.is_leaf());
        assert!(!RenderNodeKind::IFrame.is_leaf());
        assert!(
            !RenderNodeKind::Image {
                src: "a.png".to_owned()
            }
            .is_leaf()
        );
    }

    #[test]
    fn node_count_includes_descendants() {
        let style = Rc::new(ComputedStyle::default());
        let mut root = RenderNode::new(
            "div".to_owned(),
            Rc::clone(&style),
            Bounds::EMPTY,
            RenderFlags::REAL_STACKING_CONTEXT,
            RenderNodeKind::Element,
        );
        let mut child = RenderNode::new(
            "p".to_owned(),
            Rc::clone(&style),
            Bounds::EMPTY,
            RenderFlags::empty(),
            RenderNodeKind::Element,
        );
        child.push_text(TextRun::new("x".to_owned(), Rc::clone(&style)));
        root.push_child(child);
        assert_eq!(root.node_count(), 2);
        assert_eq!(root.children()[0].text_runs()[0].text(), "x");
    }
}
