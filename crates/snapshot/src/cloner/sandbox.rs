//! The hidden iframe a cloned document lives in.

use std::rc::Rc;

use anyhow::Error;
use dom::{Bounds, DocumentHandle, Frame, NodeId};
use log::{debug, warn};

use super::IGNORE_ATTRIBUTE;
use crate::error::CloneError;

/// Class given to every sandbox container.
pub const CONTAINER_CLASS: &str = "snapshot-container";

const CONTAINER_STYLE: &str =
    "visibility: hidden; position: fixed; left: -10000px; top: 0px; border: 0";

/// Create the container iframe in `owner`'s body and its browsing context.
///
/// # Errors
/// [`CloneError::SandboxWindowUnavailable`] when the owner document has no body or the
/// browsing context cannot be created.
pub fn create_container(owner: &Rc<Frame>, bounds: Bounds) -> Result<(NodeId, Rc<Frame>), Error> {
    let handle = owner.document();
    let container = {
        let mut document = handle.borrow_mut();
        let Some(body) = document.body() else {
            warn!(target: "snapshot", "owner document has no body to host the sandbox");
            return Err(CloneError::SandboxWindowUnavailable.into());
        };
        let iframe = document.create_element("iframe");
        document.set_attr(iframe, "class", CONTAINER_CLASS);
        document.set_attr(iframe, "style", CONTAINER_STYLE);
        document.set_attr(iframe, "width", bounds.width.to_string());
        document.set_attr(iframe, "height", bounds.height.to_string());
        document.set_attr(iframe, "scrolling", "no");
        document.set_attr(iframe, IGNORE_ATTRIBUTE, "true");
        document.append_child(body, iframe)?;
        iframe
    };
    match owner.attach_iframe(container) {
        Ok(frame) => Ok((container, frame)),
        Err(err) => {
            debug!(target: "snapshot", "attaching sandbox window failed: {err}");
            handle.borrow_mut().remove(container);
            Err(CloneError::SandboxWindowUnavailable.into())
        }
    }
}

/// Detach `container` and drop its browsing context.
pub fn destroy_container(owner: &Frame, container: NodeId) {
    owner.detach_iframe(container);
    let handle = owner.document();
    let Ok(mut document) = handle.try_borrow_mut() else {
        warn!(target: "snapshot", "owner document is borrowed, container {container:?} left attached");
        return;
    };
    document.remove(container);
}

/// Owns a container until it is handed out as a [`Sandbox`]. Dropping an armed guard
/// (an error, or the clone future being cancelled mid-wait) removes the container.
#[derive(Debug)]
pub(crate) struct ContainerGuard {
    owner: Rc<Frame>,
    container: NodeId,
    armed: bool,
}

impl ContainerGuard {
    pub(crate) const fn new(owner: Rc<Frame>, container: NodeId) -> Self {
        Self {
            owner,
            container,
            armed: true,
        }
    }

    pub(crate) fn into_sandbox(mut self, frame: Rc<Frame>, reference: NodeId) -> Sandbox {
        self.armed = false;
        Sandbox::new(Rc::clone(&self.owner), self.container, frame, reference)
    }
}

impl Drop for ContainerGuard {
    fn drop(&mut self) {
        if self.armed {
            debug!(target: "snapshot", "abandoned sandbox, removing container {:?}", self.container);
            destroy_container(&self.owner, self.container);
        }
    }
}

/// A loaded sandbox: the container in the owner document, its window and the located
/// clone of the reference node.
#[derive(Debug)]
pub struct Sandbox {
    owner: Rc<Frame>,
    container: NodeId,
    frame: Rc<Frame>,
    reference: NodeId,
}

impl Sandbox {
    const fn new(
        owner: Rc<Frame>,
        container: NodeId,
        frame: Rc<Frame>,
        reference: NodeId,
    ) -> Self {
        Self {
            owner,
            container,
            frame,
            reference,
        }
    }

    /// The cloned document.
    #[must_use]
    pub fn document(&self) -> DocumentHandle {
        self.frame.document()
    }

    #[inline]
    #[must_use]
    pub const fn frame(&self) -> &Rc<Frame> {
        &self.frame
    }

    /// The container iframe, in the owner document.
    #[inline]
    #[must_use]
    pub const fn container(&self) -> NodeId {
        self.container
    }

    /// Clone of the reference node, in the sandbox document.
    #[inline]
    #[must_use]
    pub const fn reference(&self) -> NodeId {
        self.reference
    }

    /// Tear the sandbox down.
    pub fn remove(self) {
        destroy_container(&self.owner, self.container);
        debug!(target: "snapshot", "removed sandbox container {:?}", self.container);
    }
}
