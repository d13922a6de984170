//! Frozen, isolated copies of a document.
//!
//! [`DocumentCloner::new`] copies the document owning the reference node into a detached
//! tree, freezing every paintable element. [`DocumentCloner::to_sandbox`] then writes that
//! tree into a hidden iframe of the owner window and waits on the [`ReadinessBarrier`]
//! before handing the sandbox out.

mod readiness;
mod sandbox;

pub use readiness::{POLL_INTERVAL, ReadinessBarrier, ReadinessCondition, resolves_images_late};
pub use sandbox::{CONTAINER_CLASS, Sandbox, create_container, destroy_container};

use core::fmt;
use core::future::Future;
use std::rc::Rc;

use anyhow::{Error, anyhow};
use dom::{
    Document, DocumentHandle, ElementRef, Frame, Freeze, NodeData, NodeId, serialize_doctype,
};
use futures::FutureExt as _;
use futures::future::LocalBoxFuture;

use crate::context::Context;
use crate::error::CloneError;
use sandbox::ContainerGuard;

/// Elements carrying this attribute are left out of clones.
pub const IGNORE_ATTRIBUTE: &str = "data-snapshot-ignore";
/// Elements carrying this attribute are cloned even if they are scripts or ignored.
pub const FORCE_CLONE_ATTRIBUTE: &str = "data-snapshot-clone";

/// Caller-supplied exclusion test.
pub type IgnorePredicate = Rc<dyn Fn(ElementRef<'_>) -> bool>;

/// Hook awaited with the sandbox document and the located clone, before the sandbox is
/// handed out. Mutations it makes are visible downstream; an error aborts the session.
pub trait OnClone {
    fn on_clone(&self, document: DocumentHandle, reference: NodeId)
    -> LocalBoxFuture<'_, Result<(), Error>>;
}

impl<Hook, Fut> OnClone for Hook
where
    Hook: Fn(DocumentHandle, NodeId) -> Fut,
    Fut: Future<Output = Result<(), Error>> + 'static,
{
    fn on_clone(
        &self,
        document: DocumentHandle,
        reference: NodeId,
    ) -> LocalBoxFuture<'_, Result<(), Error>> {
        self(document, reference).boxed_local()
    }
}

#[derive(Clone)]
pub struct CloneOptions {
    /// Keep `<style>` elements in the clone.
    pub copy_styles: bool,
    /// Force waiting (or not) for images; `None` decides by user agent.
    pub wait_for_images: Option<bool>,
    pub ignore_elements: Option<IgnorePredicate>,
    pub on_clone: Option<Rc<dyn OnClone>>,
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self {
            copy_styles: true,
            wait_for_images: None,
            ignore_elements: None,
            on_clone: None,
        }
    }
}

impl fmt::Debug for CloneOptions {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CloneOptions")
            .field("copy_styles", &self.copy_styles)
            .field("wait_for_images", &self.wait_for_images)
            .field("ignore_elements", &self.ignore_elements.is_some())
            .field("on_clone", &self.on_clone.is_some())
            .finish()
    }
}

pub struct DocumentCloner {
    context: Rc<Context>,
    options: CloneOptions,
    source: DocumentHandle,
    reference: NodeId,
    clone: Document,
    cloned_root: NodeId,
    cloned_reference: Option<NodeId>,
}

impl DocumentCloner {
    /// Clone the document owning `reference`.
    ///
    /// # Errors
    /// [`CloneError::NoOwnerDocument`] if `reference` is a document node (or gone), and
    /// [`CloneError::MissingDocumentElement`] if the document has no root element.
    pub fn new(
        context: Rc<Context>,
        source: &DocumentHandle,
        reference: NodeId,
        options: CloneOptions,
    ) -> Result<Self, CloneError> {
        let document = source.borrow();
        if !document.has_owner_document(reference) {
            return Err(CloneError::NoOwnerDocument);
        }
        let root = document
            .document_element()
            .ok_or(CloneError::MissingDocumentElement)?;

        let mut cloner = Self {
            context,
            options,
            source: Rc::clone(source),
            reference,
            clone: Document::new(),
            cloned_root: root,
            cloned_reference: None,
        };
        cloner.cloned_root = cloner.clone_node(&document, root);
        drop(document);
        cloner.context.logger.debug(format_args!(
            "Cloned {} nodes, reference located: {}",
            cloner.clone.descendants(cloner.cloned_root).len(),
            cloner.cloned_reference.is_some()
        ));
        Ok(cloner)
    }

    /// The detached clone, before it is moved into a sandbox.
    #[inline]
    #[must_use]
    pub const fn cloned_document(&self) -> &Document {
        &self.clone
    }

    /// Root element of the detached clone.
    #[inline]
    #[must_use]
    pub const fn cloned_root(&self) -> NodeId {
        self.cloned_root
    }

    /// Clone of the reference node in the detached clone, if it was reached.
    #[inline]
    #[must_use]
    pub const fn cloned_reference(&self) -> Option<NodeId> {
        self.cloned_reference
    }

    fn is_excluded(&self, source: &Document, child: NodeId) -> bool {
        let Some(element) = source.element_ref(child) else {
            return false;
        };
        let forced = element.has_attr(FORCE_CLONE_ATTRIBUTE);
        if !forced {
            if element.tag() == "script" || element.has_attr(IGNORE_ATTRIBUTE) {
                return true;
            }
            if let Some(predicate) = &self.options.ignore_elements
                && predicate(element)
            {
                return true;
            }
        }
        !self.options.copy_styles && element.tag() == "style"
    }

    fn clone_node(&mut self, source: &Document, node: NodeId) -> NodeId {
        let Some(data) = source.node(node) else {
            return self.clone.create_text(String::new());
        };
        match data {
            NodeData::Text(text) => self.clone.create_text(text.clone()),
            NodeData::Element(element) if element.namespace.is_paintable() => {
                let mut copy = element.shallow_clone();
                copy.freeze = Freeze::ALL;
                let clone = self.clone.create_node(NodeData::Element(copy));
                if node == self.reference {
                    self.cloned_reference = Some(clone);
                }
                if !element.is("video") {
                    self.clone_children(source, node, clone);
                }
                clone
            }
            NodeData::Element(element) => self
                .clone
                .create_node(NodeData::Element(element.shallow_clone())),
            other => self.clone.create_node(other.clone()),
        }
    }

    fn clone_children(&mut self, source: &Document, node: NodeId, clone: NodeId) {
        for child in source.child_nodes(node) {
            if source.is_slot(child) {
                for assigned in source.flattened_slottables(child) {
                    self.append_child_clone(source, assigned, clone);
                }
            } else {
                self.append_child_clone(source, child, clone);
            }
        }
    }

    fn append_child_clone(&mut self, source: &Document, child: NodeId, parent: NodeId) {
        if self.is_excluded(source, child) {
            return;
        }
        let copy = self.clone_node(source, child);
        if let Err(err) = self.clone.append_child(parent, copy) {
            self.context
                .logger
                .warn(format_args!("Dropping cloned node: {err}"));
        }
    }

    /// Move the clone into a sandbox hosted by `owner` and wait until it is ready.
    ///
    /// Until the sandbox is handed out the container is owned by a guard: on failure, or
    /// when this future is dropped (a caller-side timeout), the container is removed from
    /// the owner document again.
    ///
    /// # Errors
    /// [`CloneError::SandboxWindowUnavailable`], [`CloneError::ReferenceNotFound`], or the
    /// error returned by the post-clone hook.
    pub async fn to_sandbox(self, owner: &Rc<Frame>) -> Result<Sandbox, Error> {
        let (container, frame) = create_container(owner, self.context.window_bounds)?;
        let guard = ContainerGuard::new(Rc::clone(owner), container);
        let reference = self.load(&frame).await.inspect_err(|err| {
            self.context
                .logger
                .debug(format_args!("Sandbox setup failed, removing container: {err}"));
        })?;
        Ok(guard.into_sandbox(frame, reference))
    }

    async fn load(&self, frame: &Rc<Frame>) -> Result<NodeId, Error> {
        let window = self.context.window_bounds;
        let (markup, fonts, node_name) = {
            let source = self.source.borrow();
            (
                format!("{}<html></html>", serialize_doctype(source.doctype())),
                source.fonts().clone(),
                source.node_name(self.reference),
            )
        };

        frame.open_document();
        frame.write_document(&markup)?;
        let reference = {
            let handle = frame.document();
            let mut document = handle.borrow_mut();
            let (adopted, mapping) = document.adopt(&self.clone, self.cloned_root)?;
            let placeholder = document
                .document_element()
                .ok_or_else(|| anyhow!("sandbox markup produced no root element"))?;
            let root = document.root();
            document.replace_child(root, adopted, placeholder)?;
            document.remove(placeholder);
            document.set_fonts(fonts);
            self.cloned_reference
                .and_then(|clone| mapping.get(&clone).copied())
        };
        frame.scroll_to(window.left, window.top);
        frame.close_document();

        let barrier = ReadinessBarrier::new(Rc::clone(frame), self.options.wait_for_images);
        barrier.wait().await;
        self.context
            .logger
            .debug(format_args!("Sandbox ready: {:?}", barrier.conditions()));

        let reference = reference.ok_or(CloneError::ReferenceNotFound { node_name })?;
        if let Some(hook) = &self.options.on_clone {
            hook.on_clone(frame.document(), reference).await?;
        }
        Ok(reference)
    }
}

/// Clone the document owning `reference` into a sandbox of `owner`.
///
/// # Errors
/// Any [`CloneError`] (as `anyhow::Error`) or the post-clone hook's error.
pub async fn clone_document(
    context: Rc<Context>,
    owner: &Rc<Frame>,
    reference: NodeId,
    options: CloneOptions,
) -> Result<Sandbox, Error> {
    let cloner = DocumentCloner::new(context, &owner.document(), reference, options)?;
    cloner.to_sandbox(owner).await
}
