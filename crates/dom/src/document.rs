//! Arena-backed document tree.

use crate::doctype::Doctype;
use crate::frame::Frame;
use crate::geometry::Bounds;
use crate::node::{ElementData, Namespace, NodeData, ShadowRootMode};
use crate::resources::{FontFace, FontFaceSet, ImageRequest, ReadyState};
use anyhow::{Error, anyhow};
use indextree::{Arena, NodeId};
use log::trace;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Shared, mutable handle to a document. Documents are only touched from the thread that
/// owns their frame, and no borrow is ever held across an await point.
pub type DocumentHandle = Rc<RefCell<Document>>;

/// Borrowed view of one element, handed to caller-supplied predicates.
#[derive(Clone, Copy)]
pub struct ElementRef<'doc> {
    document: &'doc Document,
    id: NodeId,
    data: &'doc ElementData,
}

impl<'doc> ElementRef<'doc> {
    #[inline]
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    #[must_use]
    pub const fn document(&self) -> &'doc Document {
        self.document
    }

    #[inline]
    #[must_use]
    pub fn tag(&self) -> &'doc str {
        &self.data.tag
    }

    #[inline]
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&'doc str> {
        self.data.attr(name)
    }

    #[inline]
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.data.has_attr(name)
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|name| name == class))
    }
}

#[derive(Debug)]
pub struct Document {
    arena: Arena<NodeData>,
    root: NodeId,
    ready_state: ReadyState,
    fonts: FontFaceSet,
    images: HashMap<String, Rc<ImageRequest>>,
    default_view: Weak<Frame>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with no default view.
    #[must_use]
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(NodeData::Document);
        Self {
            arena,
            root,
            ready_state: ReadyState::Loading,
            fonts: FontFaceSet::default(),
            images: HashMap::new(),
            default_view: Weak::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn into_handle(self) -> DocumentHandle {
        Rc::new(RefCell::new(self))
    }

    /// The document node itself.
    #[inline]
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.arena
            .get(id)
            .filter(|node| !node.is_removed())
            .map(indextree::Node::get)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.arena
            .get_mut(id)
            .filter(|node| !node.is_removed())
            .map(indextree::Node::get_mut)
    }

    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.node(id).and_then(NodeData::as_element)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.node_mut(id).and_then(NodeData::as_element_mut)
    }

    #[must_use]
    pub fn element_ref(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.element(id).map(|data| ElementRef {
            document: self,
            id,
            data,
        })
    }

    #[must_use]
    pub fn is_element(&self, id: NodeId, tag: &str) -> bool {
        self.element(id).is_some_and(|data| data.is(tag))
    }

    #[must_use]
    pub fn node_name(&self, id: NodeId) -> String {
        self.node(id)
            .map_or_else(|| "#removed".to_owned(), NodeData::node_name)
    }

    /// A node has an owner document unless it is the document itself.
    #[must_use]
    pub fn has_owner_document(&self, id: NodeId) -> bool {
        self.node(id)
            .is_some_and(|data| !matches!(data, NodeData::Document))
    }

    /// Whether the node is reachable from the document node, crossing shadow boundaries.
    #[must_use]
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                return true;
            }
            current = self.parent(node).or_else(|| self.shadow_host(node));
        }
        false
    }

    pub fn create_node(&mut self, data: NodeData) -> NodeId {
        self.arena.new_node(data)
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.create_node(NodeData::Element(ElementData::new(tag, Namespace::Html)))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.create_node(NodeData::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.create_node(NodeData::Comment(text.into()))
    }

    /// Append `child` as the last child of `parent`, detaching it from any previous parent.
    ///
    /// # Errors
    /// Returns an error if the insertion would create a cycle or either node was removed.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        child.detach(&mut self.arena);
        parent
            .checked_append(child, &mut self.arena)
            .map_err(|err| anyhow!("cannot append {child:?} to {parent:?}: {err}"))
    }

    /// Insert `child` immediately before `reference`.
    ///
    /// # Errors
    /// Returns an error if the insertion would create a cycle or either node was removed.
    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) -> Result<(), Error> {
        child.detach(&mut self.arena);
        reference
            .checked_insert_before(child, &mut self.arena)
            .map_err(|err| anyhow!("cannot insert {child:?} before {reference:?}: {err}"))
    }

    /// Replace `old` with `new` under `parent`, leaving `old` detached.
    ///
    /// # Errors
    /// Returns an error if `old` is not a child of `parent` or the insertion is invalid.
    pub fn replace_child(&mut self, parent: NodeId, new: NodeId, old: NodeId) -> Result<(), Error> {
        if self.parent(old) != Some(parent) {
            return Err(anyhow!("{old:?} is not a child of {parent:?}"));
        }
        self.insert_before(old, new)?;
        old.detach(&mut self.arena);
        Ok(())
    }

    /// Detach a node (and its subtree) from the tree. The node stays valid and may be
    /// reinserted.
    pub fn detach(&mut self, id: NodeId) {
        id.detach(&mut self.arena);
    }

    /// Permanently remove a subtree from the arena.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(shadow) = self.element(id).and_then(|data| data.shadow_root) {
            shadow.remove_subtree(&mut self.arena);
        }
        id.remove_subtree(&mut self.arena);
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(indextree::Node::parent)
    }

    /// Child node ids in tree order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        if self.node(id).is_none() {
            return Vec::new();
        }
        id.children(&self.arena).collect()
    }

    /// Element children only.
    #[must_use]
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .into_iter()
            .filter(|child| self.element(*child).is_some())
            .collect()
    }

    /// Nodes that render in place of `id`'s children: the shadow root's children when one
    /// is attached, the light children otherwise.
    #[must_use]
    pub fn child_nodes(&self, id: NodeId) -> Vec<NodeId> {
        match self.shadow_root(id) {
            Some(shadow) => self.children(shadow),
            None => self.children(id),
        }
    }

    /// Pre-order descendants of `id`, including `id`. Does not enter shadow trees.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        if self.node(id).is_none() {
            return Vec::new();
        }
        id.descendants(&self.arena).collect()
    }

    #[must_use]
    pub fn doctype(&self) -> Option<&Doctype> {
        self.root.children(&self.arena).find_map(|child| {
            match self.arena[child].get() {
                NodeData::Doctype(doctype) => Some(doctype),
                _ => None,
            }
        })
    }

    /// The root element (`<html>`).
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.root
            .children(&self.arena)
            .find(|child| self.arena[*child].get().is_element())
    }

    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .into_iter()
            .find(|child| self.is_element(*child, "body"))
    }

    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|data| data.attr(name))
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(data) = self.element_mut(id) {
            data.set_attr(name, value);
        }
    }

    /// Data of a text node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.node(id)? {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Concatenated text of every text descendant.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|node| self.text(node))
            .collect()
    }

    #[must_use]
    pub fn get_element_by_id(&self, value: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|node| self.attr(*node, "id") == Some(value))
    }

    /// Elements with the given tag, in tree order.
    #[must_use]
    pub fn elements_by_tag_name(&self, tag: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|node| self.is_element(*node, tag))
            .collect()
    }

    /// Image requests of every `img` element in the tree, in tree order.
    #[must_use]
    pub fn images(&self) -> Vec<(NodeId, Option<Rc<ImageRequest>>)> {
        self.elements_by_tag_name("img")
            .into_iter()
            .filter_map(|node| Some((node, self.element(node)?.image.clone())))
            .collect()
    }

    /// Shared request for `src`, created on first use.
    pub fn request_image(&mut self, src: &str) -> Rc<ImageRequest> {
        Rc::clone(
            self.images
                .entry(src.to_owned())
                .or_insert_with(|| Rc::new(ImageRequest::new(src))),
        )
    }

    #[must_use]
    pub fn image_request(&self, src: &str) -> Option<Rc<ImageRequest>> {
        self.images.get(src).cloned()
    }

    pub fn set_client_rect(&mut self, id: NodeId, rect: Bounds) {
        if let Some(data) = self.element_mut(id) {
            data.client_rect = rect;
        }
    }

    #[inline]
    #[must_use]
    pub const fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    pub fn set_ready_state(&mut self, state: ReadyState) {
        trace!(target: "dom", "ready state {:?} -> {state:?}", self.ready_state);
        self.ready_state = state;
    }

    #[inline]
    #[must_use]
    pub const fn fonts(&self) -> &FontFaceSet {
        &self.fonts
    }

    pub fn set_fonts(&mut self, fonts: FontFaceSet) {
        self.fonts = fonts;
    }

    pub fn add_font_face(&mut self, face: Rc<FontFace>) {
        self.fonts.add(face);
    }

    /// The frame this document is displayed in.
    #[must_use]
    pub fn default_view(&self) -> Option<Rc<Frame>> {
        self.default_view.upgrade()
    }

    pub fn set_default_view(&mut self, frame: Weak<Frame>) {
        self.default_view = frame;
    }

    /// Attach a shadow root to `host`. Returns the existing root if one is attached.
    ///
    /// # Errors
    /// Returns an error if `host` is not an element.
    pub fn attach_shadow(&mut self, host: NodeId, mode: ShadowRootMode) -> Result<NodeId, Error> {
        if let Some(existing) = self.shadow_root(host) {
            return Ok(existing);
        }
        if self.element(host).is_none() {
            return Err(anyhow!("cannot attach a shadow root to {}", self.node_name(host)));
        }
        let shadow = self.create_node(NodeData::ShadowRoot { host, mode });
        if let Some(data) = self.element_mut(host) {
            data.shadow_root = Some(shadow);
        }
        Ok(shadow)
    }

    #[must_use]
    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.element(host).and_then(|data| data.shadow_root)
    }

    /// Host element of a shadow root node.
    #[must_use]
    pub fn shadow_host(&self, shadow: NodeId) -> Option<NodeId> {
        match self.node(shadow)? {
            NodeData::ShadowRoot { host, .. } => Some(*host),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_slot(&self, id: NodeId) -> bool {
        self.is_element(id, "slot")
    }

    /// Shadow root containing `id`, if `id` lives in a shadow tree.
    fn containing_shadow_root(&self, id: NodeId) -> Option<NodeId> {
        id.ancestors(&self.arena)
            .find(|node| matches!(self.arena[*node].get(), NodeData::ShadowRoot { .. }))
    }

    /// Light children of the shadow host that are assigned to `slot`, in tree order.
    #[must_use]
    pub fn assigned_nodes(&self, slot: NodeId) -> Vec<NodeId> {
        let Some(host) = self
            .containing_shadow_root(slot)
            .and_then(|shadow| self.shadow_host(shadow))
        else {
            return Vec::new();
        };
        let name = self.attr(slot, "name").unwrap_or_default();
        self.children(host)
            .into_iter()
            .filter(|child| match self.node(*child) {
                Some(NodeData::Element(data)) => data.attr("slot").unwrap_or_default() == name,
                Some(NodeData::Text(_)) => name.is_empty(),
                _ => false,
            })
            .collect()
    }

    /// Assigned nodes with nested slots expanded. An unassigned slot contributes its
    /// fallback children instead.
    #[must_use]
    pub fn flattened_slottables(&self, slot: NodeId) -> Vec<NodeId> {
        let assigned = self.assigned_nodes(slot);
        let candidates = if assigned.is_empty() {
            self.children(slot)
        } else {
            assigned
        };
        let mut out = Vec::with_capacity(candidates.len());
        for node in candidates {
            if self.is_slot(node) {
                out.extend(self.flattened_slottables(node));
            } else {
                out.push(node);
            }
        }
        out
    }

    /// Copy the subtree rooted at `node` in `source` into this document. Shadow trees are
    /// copied along with their hosts. Returns the new root and a map from source ids to
    /// new ids.
    ///
    /// # Errors
    /// Returns an error if `node` does not exist in `source`.
    pub fn adopt(
        &mut self,
        source: &Document,
        node: NodeId,
    ) -> Result<(NodeId, HashMap<NodeId, NodeId>), Error> {
        let mut mapping = HashMap::new();
        let adopted = self.adopt_node(source, node, &mut mapping)?;
        Ok((adopted, mapping))
    }

    fn adopt_node(
        &mut self,
        source: &Document,
        node: NodeId,
        mapping: &mut HashMap<NodeId, NodeId>,
    ) -> Result<NodeId, Error> {
        let data = source
            .node(node)
            .ok_or_else(|| anyhow!("cannot adopt removed node {node:?}"))?
            .clone();
        let copy = self.create_node(data);
        mapping.insert(node, copy);

        if let Some(shadow) = source.shadow_root(node) {
            let mode = match source.node(shadow) {
                Some(NodeData::ShadowRoot { mode, .. }) => *mode,
                _ => ShadowRootMode::Open,
            };
            let shadow_copy = self.create_node(NodeData::ShadowRoot { host: copy, mode });
            mapping.insert(shadow, shadow_copy);
            if let Some(data) = self.element_mut(copy) {
                data.shadow_root = Some(shadow_copy);
            }
            for child in source.children(shadow) {
                let child_copy = self.adopt_node(source, child, mapping)?;
                self.append_child(shadow_copy, child_copy)?;
            }
        }

        for child in source.children(node) {
            let child_copy = self.adopt_node(source, child, mapping)?;
            self.append_child(copy, child_copy)?;
        }
        if let Some(image) = self.element(copy).and_then(|data| data.image.clone()) {
            self.images.entry(image.src().to_owned()).or_insert(image);
        }
        Ok(copy)
    }
}
