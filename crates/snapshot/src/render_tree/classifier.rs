//! Builds the render tree from a (sandboxed) document.
//!
//! The walk is read-only and synchronous. Every element's style is resolved once, with
//! its parent's computed style; a resolver error aborts the whole walk.

use std::rc::Rc;

use dom::{Bounds, Document, ElementData, Namespace, NodeData, NodeId};
use style::{ComputedStyle, StyleError, StyleResolver, apply_text_transform, compute_with_ancestors};

use super::node::{RenderFlags, RenderNode, RenderNodeKind, TextRun};
use crate::context::Context;

/// Elements carrying this attribute get [`RenderFlags::DEBUG`].
pub const DEBUG_ATTRIBUTE: &str = "data-snapshot-debug";

const LIST_OWNERS: &[&str] = &["ol", "ul", "menu"];

/// Classify the subtree rooted at `root`.
///
/// The root node always establishes a real stacking context. Children follow document
/// order, with shadow trees and slot assignments flattened in place. Hidden elements are
/// pruned along with their subtrees.
///
/// Bounds are the client rect translated to the window origin. A transform widens them to
/// its bounding box only for elements without a freeze record, which means live documents
/// classified directly; sandboxed clones are always measured untransformed.
///
/// # Errors
/// The first [`StyleError`] raised by `resolver`; no partial tree is returned.
pub fn classify(
    context: &Context,
    resolver: &dyn StyleResolver,
    document: &Document,
    root: NodeId,
) -> Result<RenderNode, StyleError> {
    let element = document
        .element(root)
        .ok_or_else(|| StyleError::NotAnElement {
            node_name: document.node_name(root),
        })?;
    let style = Rc::new(compute_with_ancestors(resolver, document, root)?);
    let walk = Walk {
        context,
        resolver,
        document,
        root_style: Rc::clone(&style),
    };

    let flags = RenderFlags::REAL_STACKING_CONTEXT | independent_flags(element);
    let mut node = walk.create_node(root, element, style, flags);
    if !node.kind().is_leaf() {
        walk.visit_children(root, &mut node)?;
    }
    context.logger.debug(format_args!(
        "Classified {} render nodes under <{}>",
        node.node_count(),
        node.tag()
    ));
    Ok(node)
}

/// Flags assigned regardless of stacking.
fn independent_flags(element: &ElementData) -> RenderFlags {
    let mut flags = RenderFlags::empty();
    if LIST_OWNERS.iter().any(|tag| element.is(tag)) {
        flags |= RenderFlags::LIST_OWNER;
    }
    if element.has_attr(DEBUG_ATTRIBUTE) {
        flags |= RenderFlags::DEBUG;
    }
    flags
}

/// Traversal state shared by every level of the walk.
struct Walk<'doc> {
    context: &'doc Context,
    resolver: &'doc dyn StyleResolver,
    document: &'doc Document,
    root_style: Rc<ComputedStyle>,
}

impl Walk<'_> {
    fn visit_children(&self, node: NodeId, parent: &mut RenderNode) -> Result<(), StyleError> {
        for child in self.document.child_nodes(node) {
            if self.document.is_slot(child) {
                for assigned in self.document.flattened_slottables(child) {
                    self.visit(assigned, parent)?;
                }
            } else {
                self.visit(child, parent)?;
            }
        }
        Ok(())
    }

    fn visit(&self, child: NodeId, parent: &mut RenderNode) -> Result<(), StyleError> {
        match self.document.node(child) {
            Some(NodeData::Text(text)) if !text.trim().is_empty() => {
                let style = parent.shared_style();
                let painted = apply_text_transform(text, style.text_transform);
                parent.push_text(TextRun::new(painted, style));
            }
            Some(NodeData::Element(element)) => {
                let style = self
                    .resolver
                    .compute(self.document, child, Some(parent.style()))?;
                if !style.is_visible() {
                    return Ok(());
                }
                let flags = self.stacking_flags(element, &style) | independent_flags(element);
                let mut node = self.create_node(child, element, Rc::new(style), flags);
                if !node.kind().is_leaf() {
                    self.visit_children(child, &mut node)?;
                }
                parent.push_child(node);
            }
            _ => {}
        }
        Ok(())
    }

    fn stacking_flags(&self, element: &ElementData, style: &ComputedStyle) -> RenderFlags {
        if style.is_positioned_with_z_index()
            || style.opacity() < 1.0
            || style.is_transformed()
            || (element.is("body") && self.root_style.background_color.is_transparent())
        {
            RenderFlags::REAL_STACKING_CONTEXT
        } else if style.is_positioned() || style.is_floating() {
            RenderFlags::STACKING_CONTEXT
        } else {
            RenderFlags::empty()
        }
    }

    fn create_node(
        &self,
        id: NodeId,
        element: &ElementData,
        style: Rc<ComputedStyle>,
        flags: RenderFlags,
    ) -> RenderNode {
        let bounds = self.bounds(element, &style);
        RenderNode::new(element.tag.clone(), style, bounds, flags, self.kind(id, element))
    }

    fn bounds(&self, element: &ElementData, style: &ComputedStyle) -> Bounds {
        let rect = match style.transform {
            Some(transform) if !element.freeze.transform => {
                transform.transform_rect(element.client_rect)
            }
            _ => element.client_rect,
        };
        Bounds::from_client_rect(rect, &self.context.window_bounds)
    }

    fn kind(&self, id: NodeId, element: &ElementData) -> RenderNodeKind {
        let attr = |name: &str| element.attr(name).unwrap_or_default().to_owned();
        match element.tag.as_str() {
            "img" => RenderNodeKind::Image { src: attr("src") },
            "video" => RenderNodeKind::Video,
            "svg" if element.namespace == Namespace::Svg => RenderNodeKind::Svg,
            "canvas" => RenderNodeKind::Canvas,
            "input" => RenderNodeKind::TextInput {
                value: attr("value"),
                placeholder: attr("placeholder"),
            },
            "textarea" => RenderNodeKind::TextArea {
                value: self.document.text_content(id),
            },
            "select" => RenderNodeKind::Select {
                value: self.selected_option(id),
            },
            "iframe" => RenderNodeKind::IFrame,
            _ => RenderNodeKind::Element,
        }
    }

    /// Label of the `selected` option, or of the first option when none is marked.
    fn selected_option(&self, select: NodeId) -> String {
        let options: Vec<NodeId> = self
            .document
            .descendants(select)
            .into_iter()
            .filter(|node| self.document.is_element(*node, "option"))
            .collect();
        options
            .iter()
            .find(|option| {
                self.document
                    .element(**option)
                    .is_some_and(|data| data.has_attr("selected"))
            })
            .or_else(|| options.first())
            .map(|option| self.document.text_content(*option).trim().to_owned())
            .unwrap_or_default()
    }
}
