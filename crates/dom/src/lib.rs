//! In-process DOM model used by the snapshot pipeline.
//!
//! A [`Document`] is an arena-backed node tree; a [`Frame`] is the browsing context
//! that hosts it (scroll offset, viewport, load signal, nested iframes). Shared
//! image requests and font faces live in [`resources`] and are driven by whichever
//! resource loader the embedder plugs in.

#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

mod doctype;
pub mod document;
pub mod frame;
pub mod geometry;
pub mod node;
pub mod parser;
pub mod resources;

pub use doctype::{Doctype, serialize_doctype};
pub use document::{Document, DocumentHandle, ElementRef};
pub use frame::{Frame, FrameOptions};
pub use geometry::Bounds;
pub use indextree::NodeId;
pub use node::{ElementData, Freeze, Namespace, NodeData, ShadowRootMode};
pub use parser::parse_html;
pub use resources::{FontFace, FontFaceSet, FontStatus, ImageRequest, ImageState, ReadyState};
