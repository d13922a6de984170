//! HTML5 parsing using html5ever.

use crate::doctype::Doctype;
use crate::document::Document;
use crate::node::{ElementData, Namespace, NodeData, ShadowRootMode};
use crate::resources::ReadyState;
use html5ever::tendril::TendrilSink as _;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{ParseOpts, parse_document};
use indextree::NodeId;
use log::{trace, warn};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// Parse a complete HTML document. The result is fully parsed and has no default view.
#[must_use]
pub fn parse_html(markup: &str) -> Document {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            exact_errors: false,
            ..TreeBuilderOpts::default()
        },
        ..ParseOpts::default()
    };
    let dom: RcDom = parse_document(RcDom::default(), opts).one(markup);
    trace!(target: "dom::parser", "parsed {} bytes of markup", markup.len());
    let mut converter = Converter {
        document: Document::new(),
    };
    let root = converter.document.root();
    converter.convert_children(&dom.document, root);
    let mut document = converter.document;
    document.set_ready_state(ReadyState::Complete);
    document
}

struct Converter {
    document: Document,
}

impl Converter {
    fn convert_children(&mut self, rc_node: &Handle, parent: NodeId) {
        for child in rc_node.children.borrow().iter() {
            self.convert_node(child, parent);
        }
    }

    fn append(&mut self, parent: NodeId, child: NodeId) {
        if let Err(err) = self.document.append_child(parent, child) {
            warn!(target: "dom::parser", "dropping node: {err}");
        }
    }

    fn convert_node(&mut self, rc_node: &Handle, parent: NodeId) {
        match &rc_node.data {
            RcNodeData::Document => self.convert_children(rc_node, parent),

            RcNodeData::Doctype {
                name,
                public_id,
                system_id,
            } => {
                let node = self.document.create_node(NodeData::Doctype(Doctype {
                    name: name.to_string(),
                    public_id: public_id.to_string(),
                    system_id: system_id.to_string(),
                    internal_subset: String::new(),
                }));
                self.append(parent, node);
            }

            RcNodeData::Text { contents } => {
                let node = self.document.create_text(contents.borrow().to_string());
                self.append(parent, node);
            }

            RcNodeData::Comment { contents } => {
                let node = self.document.create_comment(contents.to_string());
                self.append(parent, node);
            }

            RcNodeData::Element {
                name,
                attrs,
                template_contents,
                ..
            } => {
                let mut data = ElementData::new(name.local.to_string(), Namespace::from_url(&name.ns));
                for attr in attrs.borrow().iter() {
                    data.set_attr(&attr.name.local, attr.value.to_string());
                }

                // <template shadowrootmode> attaches its content as the parent's shadow root.
                if data.is("template")
                    && let Some(mode) = data.attr("shadowrootmode").and_then(shadow_root_mode)
                    && self.document.element(parent).is_some()
                    && self.document.shadow_root(parent).is_none()
                {
                    match self.document.attach_shadow(parent, mode) {
                        Ok(shadow) => {
                            if let Some(contents) = template_contents.borrow().as_ref() {
                                self.convert_children(contents, shadow);
                            }
                        }
                        Err(err) => warn!(target: "dom::parser", "{err}"),
                    }
                    return;
                }

                if data.is("img")
                    && let Some(src) = data.attr("src").filter(|src| !src.is_empty())
                {
                    let src = src.to_owned();
                    data.image = Some(self.document.request_image(&src));
                }

                let node = self.document.create_node(NodeData::Element(data));
                self.append(parent, node);

                if let Some(contents) = template_contents.borrow().as_ref() {
                    self.convert_children(contents, node);
                }
                self.convert_children(rc_node, node);
            }

            RcNodeData::ProcessingInstruction { .. } => {}
        }
    }
}

fn shadow_root_mode(value: &str) -> Option<ShadowRootMode> {
    if value.eq_ignore_ascii_case("open") {
        Some(ShadowRootMode::Open)
    } else if value.eq_ignore_ascii_case("closed") {
        Some(ShadowRootMode::Closed)
    } else {
        None
    }
}
