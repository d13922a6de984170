//! Browsing contexts: the window a document is displayed in.

use crate::document::{Document, DocumentHandle};
use crate::parser::parse_html;
use crate::resources::ReadyState;
use anyhow::{Error, anyhow};
use indextree::NodeId;
use log::debug;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tokio::sync::watch;

/// User agent reported by frames that don't override it.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) snapshot/0.1";

/// Construction parameters for a top-level frame.
#[derive(Clone, Debug)]
pub struct FrameOptions {
    pub width: f32,
    pub height: f32,
    pub scroll_x: f32,
    pub scroll_y: f32,
    pub user_agent: String,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// A window: owns one document plus the nested browsing contexts of its iframes.
#[derive(Debug)]
pub struct Frame {
    this: Weak<Frame>,
    parent: Weak<Frame>,
    document: DocumentHandle,
    viewport: Cell<(f32, f32)>,
    scroll: Cell<(f32, f32)>,
    user_agent: String,
    loaded: watch::Sender<bool>,
    write_buffer: RefCell<Option<String>>,
    iframes: RefCell<Vec<(NodeId, Rc<Frame>)>>,
}

impl Frame {
    fn build(document: Document, options: &FrameOptions, parent: Weak<Self>) -> Rc<Self> {
        let complete = document.ready_state() == ReadyState::Complete;
        let handle = document.into_handle();
        Rc::new_cyclic(|this: &Weak<Self>| {
            handle.borrow_mut().set_default_view(this.clone());
            Self {
                this: this.clone(),
                parent,
                document: Rc::clone(&handle),
                viewport: Cell::new((options.width, options.height)),
                scroll: Cell::new((options.scroll_x, options.scroll_y)),
                user_agent: options.user_agent.clone(),
                loaded: watch::channel(complete).0,
                write_buffer: RefCell::new(None),
                iframes: RefCell::new(Vec::new()),
            }
        })
    }

    /// Host `document` in a new top-level window. A document that is already complete
    /// counts as loaded.
    #[must_use]
    pub fn new(document: Document, options: &FrameOptions) -> Rc<Self> {
        Self::build(document, options, Weak::new())
    }

    /// Parse `markup` and host the result in a new, loaded, top-level window.
    #[must_use]
    pub fn load_html(markup: &str, options: &FrameOptions) -> Rc<Self> {
        Self::new(parse_html(markup), options)
    }

    #[inline]
    #[must_use]
    pub fn document(&self) -> DocumentHandle {
        Rc::clone(&self.document)
    }

    #[must_use]
    pub fn parent(&self) -> Option<Rc<Self>> {
        self.parent.upgrade()
    }

    #[inline]
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[inline]
    #[must_use]
    pub fn inner_width(&self) -> f32 {
        self.viewport.get().0
    }

    #[inline]
    #[must_use]
    pub fn inner_height(&self) -> f32 {
        self.viewport.get().1
    }

    #[inline]
    #[must_use]
    pub fn scroll_x(&self) -> f32 {
        self.scroll.get().0
    }

    #[inline]
    #[must_use]
    pub fn scroll_y(&self) -> f32 {
        self.scroll.get().1
    }

    pub fn scroll_to(&self, x: f32, y: f32) {
        self.scroll.set((x, y));
    }

    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        *self.loaded.borrow()
    }

    /// Resolve once the load event of the current document has fired.
    pub async fn load_event(&self) {
        let mut receiver = self.loaded.subscribe();
        if receiver.wait_for(|loaded| *loaded).await.is_err() {
            debug!(target: "dom", "load signal dropped before firing");
        }
    }

    /// Create the nested browsing context for `iframe`, an element of this frame's
    /// document. The new context starts with an empty, loading document.
    ///
    /// # Errors
    /// Returns an error if `iframe` is not a connected `iframe` element.
    pub fn attach_iframe(&self, iframe: NodeId) -> Result<Rc<Self>, Error> {
        if let Some(existing) = self.content_frame(iframe) {
            return Ok(existing);
        }
        let (width, height) = {
            let document = self.document.borrow();
            if !document.is_element(iframe, "iframe") || !document.is_connected(iframe) {
                return Err(anyhow!("{} is not a connected iframe", document.node_name(iframe)));
            }
            let dimension = |name: &str, fallback: f32| {
                document
                    .attr(iframe, name)
                    .and_then(|value| value.trim().parse::<f32>().ok())
                    .unwrap_or(fallback)
            };
            (dimension("width", 300.0), dimension("height", 150.0))
        };
        let options = FrameOptions {
            width,
            height,
            user_agent: self.user_agent.clone(),
            ..FrameOptions::default()
        };
        let child = Self::build(Document::new(), &options, self.this.clone());
        self.iframes.borrow_mut().push((iframe, Rc::clone(&child)));
        debug!(target: "dom", "attached browsing context {width}x{height} to {iframe:?}");
        Ok(child)
    }

    /// `iframe.contentWindow`.
    #[must_use]
    pub fn content_frame(&self, iframe: NodeId) -> Option<Rc<Self>> {
        self.iframes
            .borrow()
            .iter()
            .find(|(element, _)| *element == iframe)
            .map(|(_, frame)| Rc::clone(frame))
    }

    /// Drop the browsing context of `iframe`, if any.
    pub fn detach_iframe(&self, iframe: NodeId) -> Option<Rc<Self>> {
        let mut iframes = self.iframes.borrow_mut();
        let position = iframes.iter().position(|(element, _)| *element == iframe)?;
        Some(iframes.remove(position).1)
    }

    /// `document.open()`: discard the current document and start a fresh, loading one.
    pub fn open_document(&self) {
        *self.write_buffer.borrow_mut() = Some(String::new());
        self.loaded.send_replace(false);
        self.replace_document(Document::new());
    }

    /// `document.write()`: append markup and re-parse the written stream.
    ///
    /// # Errors
    /// Returns an error if the document was not opened for writing.
    pub fn write_document(&self, markup: &str) -> Result<(), Error> {
        let stream = {
            let mut buffer = self.write_buffer.borrow_mut();
            let stream = buffer
                .as_mut()
                .ok_or_else(|| anyhow!("document is not open for writing"))?;
            stream.push_str(markup);
            stream.clone()
        };
        let mut parsed = parse_html(&stream);
        parsed.set_ready_state(ReadyState::Loading);
        self.replace_document(parsed);
        Ok(())
    }

    /// `document.close()`: finish parsing and fire the load event.
    pub fn close_document(&self) {
        if self.write_buffer.borrow_mut().take().is_none() {
            return;
        }
        self.document
            .borrow_mut()
            .set_ready_state(ReadyState::Complete);
        self.loaded.send_replace(true);
    }

    /// Swap the contents behind the shared handle, keeping handle identity for holders.
    fn replace_document(&self, mut document: Document) {
        document.set_default_view(self.this.clone());
        let fonts = self.document.borrow().fonts().clone();
        document.set_fonts(fonts);
        *self.document.borrow_mut() = document;
    }
}
