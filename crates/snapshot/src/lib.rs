//! Frozen DOM snapshots.
//!
//! [`render_element`] clones the document owning a reference element into a hidden
//! sandbox, waits for the sandbox to load its fonts and images, and classifies the
//! cloned reference into a [`RenderNode`] tree annotated with stacking flags. The tree is
//! what a rasterizer consumes; the live document is never touched beyond hosting the
//! sandbox container.

#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

pub mod cloner;
pub mod config;
pub mod context;
mod error;
mod logger;
pub mod render_tree;

use std::rc::Rc;

use anyhow::Error;
use dom::{Bounds, DocumentHandle, NodeId};
use serde::Serialize;
use style::{InlineStyleResolver, StyleResolver};

pub use cloner::{CloneOptions, DocumentCloner, Sandbox, clone_document};
pub use config::{Options, SnapshotConfig, WindowOptions};
pub use context::{Context, ContextOptions, ResourceOptions};
pub use error::{CloneError, SnapshotError};
pub use logger::Logger;
pub use render_tree::{RenderFlags, RenderNode, RenderNodeKind, TextRun, classify};

/// Result of one snapshot session.
#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub root: RenderNode,
    /// Handed untouched to the resource loader.
    pub resources: ResourceOptions,
    pub window_bounds: Bounds,
    pub session_id: u64,
    /// The live sandbox, when `remove_container` was off.
    #[serde(skip)]
    pub sandbox: Option<Sandbox>,
}

/// Snapshot `element` with the built-in inline style resolver.
///
/// # Errors
/// See [`render_element_with`].
pub async fn render_element(
    document: &DocumentHandle,
    element: NodeId,
    options: Options,
) -> Result<Snapshot, Error> {
    render_element_with(document, element, options, &InlineStyleResolver::default()).await
}

/// Snapshot `element`, resolving styles with `resolver`.
///
/// # Errors
/// [`SnapshotError::InvalidElement`] when `element` is not an element of the document,
/// [`CloneError::NoOwnerDocument`] for the document node itself,
/// [`SnapshotError::NoDefaultView`] when the document is not hosted by a frame, any other
/// [`CloneError`], the post-clone hook's error, or a [`style::StyleError`].
pub async fn render_element_with(
    document: &DocumentHandle,
    element: NodeId,
    options: Options,
    resolver: &dyn StyleResolver,
) -> Result<Snapshot, Error> {
    let frame = {
        let source = document.borrow();
        if source.node(element).is_none() {
            return Err(SnapshotError::InvalidElement.into());
        }
        if !source.has_owner_document(element) {
            return Err(CloneError::NoOwnerDocument.into());
        }
        let frame = source.default_view().ok_or(SnapshotError::NoDefaultView)?;
        if source.element(element).is_none() {
            return Err(SnapshotError::InvalidElement.into());
        }
        frame
    };

    let window = options.window;
    let window_bounds = Bounds::new(
        window.scroll_x.unwrap_or_else(|| frame.scroll_x()),
        window.scroll_y.unwrap_or_else(|| frame.scroll_y()),
        window.width.unwrap_or_else(|| frame.inner_width()),
        window.height.unwrap_or_else(|| frame.inner_height()),
    );
    let context = Rc::new(Context::new(&options.context_options(), window_bounds));
    context.logger.debug(format_args!(
        "Starting document clone with size {}x{} scrolled to {},{}",
        window_bounds.width, window_bounds.height, window_bounds.left, window_bounds.top
    ));

    let cloner = DocumentCloner::new(Rc::clone(&context), document, element, options.clone)?;
    let sandbox = cloner.to_sandbox(&frame).await?;
    context.logger.debug(format_args!("Document cloned"));

    let classified = {
        let handle = sandbox.document();
        let cloned = handle.borrow();
        classify(&context, resolver, &cloned, sandbox.reference())
    };
    let root = match classified {
        Ok(root) => root,
        Err(err) => {
            sandbox.remove();
            return Err(err.into());
        }
    };
    context.logger.debug(format_args!("Finished classifying render tree"));

    let sandbox = if options.remove_container {
        sandbox.remove();
        None
    } else {
        Some(sandbox)
    };
    Ok(Snapshot {
        root,
        resources: context.resources.clone(),
        window_bounds,
        session_id: context.session_id(),
        sandbox,
    })
}
